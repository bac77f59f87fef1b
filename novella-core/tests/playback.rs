//! Playback flow tests: scene entry, advancement, choice branching, and
//! the scene-end / game-end policies, all against in-memory fakes.

use novella_core::testing::{
    assert_dialogue, assert_position, assert_status, AudioCall, StaticScripts, TestHarness,
};
use novella_core::{Choice, EngineError, EngineStatus, Event, Scene};

fn scene(id: &str, events: Vec<Event>) -> Scene {
    Scene {
        id: id.to_string(),
        title: id.to_string(),
        background: None,
        music: None,
        events,
    }
}

fn linear_scene() -> Scene {
    Scene {
        background: Some("street.jpg".to_string()),
        music: Some("theme.mp3".to_string()),
        ..scene(
            "chapter1_scene01",
            vec![
                Event::dialogue("ayu", "Morning."),
                Event::ShowCharacter {
                    character: "ayu".to_string(),
                    position: None,
                },
                Event::ChangeBackground {
                    background: "school.jpg".to_string(),
                },
                Event::PlaySfx {
                    sfx: "bell.mp3".to_string(),
                },
                Event::HideCharacter {
                    character: "ayu".to_string(),
                },
            ],
        )
    }
}

fn branching_scene() -> Scene {
    scene(
        "chapter1_scene01",
        vec![
            Event::narration("A fork in the road."),
            Event::choice(vec![
                Choice::leading_to("choice_0", "Go left", "chapter1_scene02"),
                Choice::new("choice_1", "Stay put"),
            ]),
            Event::narration("You stayed."),
        ],
    )
}

// =============================================================================
// Scene entry
// =============================================================================

#[tokio::test]
async fn new_game_enters_the_first_scene_at_index_zero() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(linear_scene()));

    harness.engine.start_new_game().await.expect("start");

    assert_position(&harness, "chapter1_scene01", 0);
    assert_dialogue(&harness, "ayu", "Morning.");
    assert_status(&harness, EngineStatus::Playing);
    assert_eq!(harness.engine.state().background, "street.jpg");
    assert!(harness.engine.state().is_playing);
}

#[tokio::test]
async fn scene_entry_requests_declared_music() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(linear_scene()));

    harness.engine.start_new_game().await.expect("start");

    assert!(harness.audio.calls().contains(&AudioCall::PlayMusic {
        track: "theme.mp3".to_string(),
        fade_in: true,
    }));
}

#[tokio::test]
async fn initialization_pushes_volume_levels_exactly_once() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(linear_scene()));

    harness.engine.initialize().await;
    harness.engine.initialize().await;

    let volume_pushes = harness
        .audio
        .calls()
        .iter()
        .filter(|call| matches!(call, AudioCall::MasterVolume(_)))
        .count();
    assert_eq!(volume_pushes, 1);
}

#[tokio::test]
async fn missing_start_scene_is_surfaced() {
    let mut harness = TestHarness::new(StaticScripts::new());

    match harness.engine.start_new_game().await {
        Err(EngineError::Script(_)) => {}
        other => panic!("expected a script error, got {other:?}"),
    }
}

// =============================================================================
// Advancement
// =============================================================================

#[tokio::test]
async fn advancing_interprets_each_event_kind() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(linear_scene()));
    harness.engine.start_new_game().await.expect("start");

    harness.engine.next_event().await; // showCharacter
    assert_eq!(harness.engine.state().characters, vec!["ayu"]);

    harness.engine.next_event().await; // changeBackground
    assert_eq!(harness.engine.state().background, "school.jpg");

    harness.engine.next_event().await; // playSfx
    assert!(harness
        .audio
        .calls()
        .contains(&AudioCall::PlaySfx("bell.mp3".to_string())));

    harness.engine.next_event().await; // hideCharacter
    assert!(harness.engine.state().characters.is_empty());
}

#[tokio::test]
async fn dialogue_can_carry_a_simultaneous_background_change() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(scene(
        "chapter1_scene01",
        vec![
            Event::narration("..."),
            Event::Dialogue {
                speaker: Some("ayu".to_string()),
                text: Some("Look at the sky!".to_string()),
                background_change: Some("rooftop.jpg".to_string()),
            },
        ],
    )));
    harness.engine.start_new_game().await.expect("start");

    harness.engine.next_event().await;

    assert_eq!(harness.engine.state().background, "rooftop.jpg");
    assert_dialogue(&harness, "ayu", "Look at the sky!");
}

#[tokio::test]
async fn dialogue_without_speaker_is_attributed_to_the_narrator() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(scene(
        "chapter1_scene01",
        vec![Event::Dialogue {
            speaker: None,
            text: None,
            background_change: None,
        }],
    )));
    harness.engine.start_new_game().await.expect("start");

    assert_dialogue(&harness, "narrator", "");
}

#[tokio::test]
async fn pausing_blocks_advancement_until_resume() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(linear_scene()));
    harness.engine.start_new_game().await.expect("start");

    harness.engine.pause().await;
    assert_status(&harness, EngineStatus::Paused);
    assert!(harness.engine.state().is_paused);
    assert!(harness.audio.calls().contains(&AudioCall::PauseMusic));

    harness.engine.next_event().await;
    assert_position(&harness, "chapter1_scene01", 0);

    harness.engine.resume().await;
    assert!(harness.audio.calls().contains(&AudioCall::ResumeMusic));
    harness.engine.next_event().await;
    assert_position(&harness, "chapter1_scene01", 1);
}

#[tokio::test]
async fn pause_only_applies_to_a_playing_engine() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(linear_scene()));

    harness.engine.pause().await;
    assert_status(&harness, EngineStatus::Uninitialized);
    assert!(!harness.engine.state().is_paused);
}

// =============================================================================
// Choice resolution
// =============================================================================

#[tokio::test]
async fn choice_with_a_target_branches_to_that_scene() {
    let scripts = StaticScripts::new()
        .with_scene(branching_scene())
        .with_scene(scene(
            "chapter1_scene02",
            vec![Event::narration("Down the left path.")],
        ));
    let mut harness = TestHarness::new(scripts);
    harness.engine.start_new_game().await.expect("start");
    harness.engine.next_event().await; // the choice event

    assert_eq!(harness.choice_texts(), vec!["Go left", "Stay put"]);

    harness.engine.make_choice("choice_0").await.expect("choose");

    assert_position(&harness, "chapter1_scene02", 0);
    assert_dialogue(&harness, "narrator", "Down the left path.");
    assert!(harness.engine.state().current_choices.is_empty());
}

#[tokio::test]
async fn choice_without_a_target_continues_the_current_scene() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(branching_scene()));
    harness.engine.start_new_game().await.expect("start");
    harness.engine.next_event().await;

    harness.engine.make_choice("choice_1").await.expect("choose");

    assert_position(&harness, "chapter1_scene01", 2);
    assert_dialogue(&harness, "narrator", "You stayed.");
    assert!(harness.engine.state().current_choices.is_empty());
}

#[tokio::test]
async fn unknown_choice_id_changes_nothing() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(branching_scene()));
    harness.engine.start_new_game().await.expect("start");
    harness.engine.next_event().await;

    let before = harness.engine.state().clone();
    harness.engine.make_choice("bogus").await.expect("no-op");

    assert_eq!(harness.engine.state(), &before);
}

#[tokio::test]
async fn back_to_back_choice_events_keep_their_fresh_options() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(scene(
        "chapter1_scene01",
        vec![
            Event::choice(vec![Choice::new("choice_0", "First question")]),
            Event::choice(vec![Choice::new("choice_0", "Second question")]),
        ],
    )));
    harness.engine.start_new_game().await.expect("start");

    harness.engine.make_choice("choice_0").await.expect("choose");

    assert_eq!(harness.choice_texts(), vec!["Second question"]);
}

// =============================================================================
// Scene-end and game-end policies
// =============================================================================

#[tokio::test]
async fn cursor_exhaustion_autosaves_once_and_keeps_playing() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(scene(
        "chapter1_scene01",
        vec![Event::narration("Only line.")],
    )));
    harness.engine.start_new_game().await.expect("start");
    assert_eq!(harness.autosave_writes(), 0);

    harness.engine.next_event().await;

    assert_eq!(harness.autosave_writes(), 1);
    assert_status(&harness, EngineStatus::Playing);
    assert!(harness
        .engine
        .state()
        .progress
        .completed_scenes
        .contains("chapter1_scene01"));
}

#[tokio::test]
async fn end_event_ends_the_playthrough_without_saving() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(scene(
        "chapter1_scene01",
        vec![Event::narration("The end approaches."), Event::End],
    )));
    harness.engine.start_new_game().await.expect("start");

    harness.engine.next_event().await;

    assert_status(&harness, EngineStatus::Ended);
    assert!(!harness.engine.state().is_playing);
    assert_eq!(harness.autosave_writes(), 0);

    // Ended is terminal: further advancement is a no-op.
    harness.engine.next_event().await;
    assert_position(&harness, "chapter1_scene01", 1);
}

#[tokio::test]
async fn a_new_game_leaves_the_ended_state() {
    let mut harness = TestHarness::new(StaticScripts::new().with_scene(scene(
        "chapter1_scene01",
        vec![Event::End],
    )));

    harness.engine.start_new_game().await.expect("start");
    assert_status(&harness, EngineStatus::Ended);

    harness.engine.start_new_game().await.expect("restart");
    assert_position(&harness, "chapter1_scene01", 0);
}

#[tokio::test]
async fn empty_scene_runs_the_scene_end_policy_on_arrival() {
    let mut harness =
        TestHarness::new(StaticScripts::new().with_scene(scene("chapter1_scene01", vec![])));

    harness.engine.start_new_game().await.expect("start");

    assert_eq!(harness.autosave_writes(), 1);
    assert_status(&harness, EngineStatus::Playing);
}

// =============================================================================
// Character display fallback
// =============================================================================

#[tokio::test]
async fn unknown_character_displays_as_its_raw_id() {
    let scripts = StaticScripts::new()
        .with_scene(linear_scene())
        .with_character(novella_core::CharacterData {
            id: "ayu".to_string(),
            name: "Ayu".to_string(),
            color: "#4a90e2".to_string(),
            avatar: None,
        });
    let harness = TestHarness::new(scripts);

    let known = harness.engine.character_display("ayu");
    assert_eq!(known.name, "Ayu");
    assert_eq!(known.color, "#4a90e2");

    let unknown = harness.engine.character_display("stranger");
    assert_eq!(unknown.name, "stranger");
    assert_eq!(unknown.color, novella_core::DEFAULT_CHARACTER_COLOR);
}

// crates/flowworld/tests/scripted_world_test.rs

use flowcore::{SequenceRef, World};
use flowworld::{NullWorld, ObjectiveState, ScriptedWorld, WorldCall, WorldScript};

#[test]
fn test_dialogue_plays_for_scripted_duration() {
    let world = ScriptedWorld::new(
        WorldScript::new()
            .with_dialogue("intro", 1.0)
            .with_default_dialogue_seconds(0.5),
    );
    let intro = SequenceRef::from("intro");
    let bark = SequenceRef::from("bark");

    world.play_dialogue(&intro);
    world.play_dialogue(&bark);
    assert_eq!(world.playing(), vec![bark.clone(), intro.clone()]);

    world.advance(0.5);
    assert!(world.is_dialogue_playing(&intro));
    assert!(!world.is_dialogue_playing(&bark));

    world.advance(0.5);
    assert!(!world.is_dialogue_playing(&intro));
}

#[test]
fn test_zero_duration_dialogue_never_plays() {
    let world = ScriptedWorld::new(WorldScript::new());
    let line = SequenceRef::from("line");

    world.play_dialogue(&line);

    assert!(!world.is_dialogue_playing(&line));
    assert_eq!(world.journal(), vec![WorldCall::PlayDialogue { sequence: line }]);
}

#[test]
fn test_finish_dialogue_skips_ahead() {
    let world = ScriptedWorld::new(WorldScript::new().with_default_dialogue_seconds(60.0));
    let speech = SequenceRef::from("speech");

    world.play_dialogue(&speech);
    world.finish_dialogue(&speech);

    assert!(world.playing().is_empty());
}

#[test]
fn test_conditions_start_from_script_and_can_change() {
    let world = ScriptedWorld::new(WorldScript::new().with_condition("door_locked"));

    assert!(world.is_condition_true("door_locked"));
    assert!(!world.is_condition_true("has_key"));

    world.set_condition("has_key", true);
    world.set_condition("door_locked", false);

    assert!(world.is_condition_true("has_key"));
    assert!(!world.is_condition_true("door_locked"));
}

#[test]
fn test_objectives_and_journal() {
    let world = ScriptedWorld::new(WorldScript::new());

    assert_eq!(world.objective_state("escort"), ObjectiveState::Inactive);

    world.activate_objective("escort");
    assert_eq!(world.objective_state("escort"), ObjectiveState::Active);

    world.complete_objective("escort");
    assert_eq!(world.objective_state("escort"), ObjectiveState::Completed);

    let journal = world.take_journal();
    assert_eq!(
        journal,
        vec![
            WorldCall::ActivateObjective { objective_id: "escort".to_string() },
            WorldCall::CompleteObjective { objective_id: "escort".to_string() },
        ]
    );
    assert!(world.journal().is_empty());
}

#[test]
fn test_parse_world_script() {
    let json = r#"{
        "conditions": ["player_has_key"],
        "dialogue_seconds": { "intro_talk": 2.5 },
        "triggers": [
            { "at_tick": 10, "trigger_id": "gate_lever" },
            { "at_tick": 10, "trigger_id": "alarm" },
            { "at_tick": 40, "trigger_id": "gate_lever" }
        ]
    }"#;

    let script = WorldScript::from_json_str(json).unwrap();

    assert_eq!(script.conditions, vec!["player_has_key"]);
    assert_eq!(script.dialogue_duration("intro_talk"), 2.5);
    assert_eq!(script.dialogue_duration("unknown"), 0.0);
    assert_eq!(script.triggers_at(10).collect::<Vec<_>>(), vec!["gate_lever", "alarm"]);
    assert_eq!(script.triggers_at(40).count(), 1);
    assert_eq!(script.triggers_at(11).count(), 0);

    let built = WorldScript::new()
        .with_condition("player_has_key")
        .with_dialogue("intro_talk", 2.5)
        .with_trigger(10, "gate_lever")
        .with_trigger(10, "alarm")
        .with_trigger(40, "gate_lever");
    assert_eq!(built, script);
}

#[test]
fn test_load_missing_script_is_io_error() {
    let err = WorldScript::load("/nonexistent/world.json").unwrap_err();

    assert!(matches!(err, flowcore::FlowError::Io(_)));
}

#[test]
fn test_null_world_does_nothing() {
    let world = NullWorld;
    let line = SequenceRef::from("line");

    world.play_dialogue(&line);
    world.activate_objective("anything");

    assert!(!world.is_dialogue_playing(&line));
    assert!(!world.is_condition_true("anything"));
}

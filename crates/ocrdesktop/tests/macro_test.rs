//! Macro file format compatibility tests.
//!
//! The `.ocrm` format predates this implementation; files recorded by
//! older versions must keep loading, so the exact line layout is pinned
//! here.

use ocrdesktop::input::KeyPhase;
use ocrdesktop::macros::{parse_macro, serialize_macro, MacroFile, MacroStep};
use ocrdesktop::types::MouseAction;
use tempfile::tempdir;

#[test]
fn test_legacy_file_loads() {
    let content = "c,delay,0.9\nm,412,388,b1c\nc,delay,0.9\nm,640,400,b1d\nk,65293,Return,2\n";
    let steps = parse_macro(content).unwrap();

    assert_eq!(steps.len(), 5);
    assert_eq!(
        steps[1],
        MacroStep::Mouse {
            x: 412,
            y: 388,
            action: MouseAction::LeftClick
        }
    );
    assert_eq!(
        steps[3],
        MacroStep::Mouse {
            x: 640,
            y: 400,
            action: MouseAction::DoubleClick
        }
    );
    assert_eq!(
        steps[4],
        MacroStep::Key {
            value: 65293,
            name: "Return".to_string(),
            phase: KeyPhase::Tap,
        }
    );
}

#[test]
fn test_recorded_file_layout_is_stable() {
    let dir = tempdir().unwrap();
    let macro_file = MacroFile::at(dir.path().join("nav.ocrm"));

    macro_file.append_mouse(412, 388, MouseAction::LeftClick).unwrap();
    macro_file.append_key(65293, "Return", KeyPhase::Tap).unwrap();

    let content = std::fs::read_to_string(macro_file.path()).unwrap();
    assert_eq!(content, "c,delay,0.9\nm,412,388,b1c\nk,65293,Return,2\n");
}

#[test]
fn test_move_only_uses_none_token() {
    let steps = vec![MacroStep::Mouse {
        x: 5,
        y: 6,
        action: MouseAction::MoveOnly,
    }];
    assert_eq!(serialize_macro(&steps), "m,5,6,None\n");

    // Older recordings used "abs" for pointer moves.
    let legacy = parse_macro("m,5,6,abs\n").unwrap();
    assert_eq!(legacy, steps);
}

#[test]
fn test_invalid_file_reports_line_number() {
    let content = "c,delay,0.9\nm,412,388,b1c\nbroken line\n";
    let err = parse_macro(content).unwrap_err();
    assert!(err.to_string().contains("line 3"));
}

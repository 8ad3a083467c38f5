//! Keyboard and mouse sampling into per-frame [`Intents`].

use raylib::prelude::*;

use super::session::Intents;

fn axis(window: &RaylibHandle, positive: KeyboardKey, negative: KeyboardKey) -> f32 {
    let mut value = 0.0;
    if window.is_key_down(positive) {
        value += 1.0;
    }
    if window.is_key_down(negative) {
        value -= 1.0;
    }
    value
}

/// Sample the current input state. Called once per frame.
pub fn process_events(window: &RaylibHandle) -> Intents {
    let mouse = window.get_mouse_delta();
    let forward = axis(window, KeyboardKey::KEY_W, KeyboardKey::KEY_S)
        + axis(window, KeyboardKey::KEY_UP, KeyboardKey::KEY_DOWN);
    let strafe = axis(window, KeyboardKey::KEY_D, KeyboardKey::KEY_A);

    Intents {
        forward: forward.clamp(-1.0, 1.0),
        strafe,
        sprint: window.is_key_down(KeyboardKey::KEY_LEFT_SHIFT)
            || window.is_key_down(KeyboardKey::KEY_RIGHT_SHIFT),
        jump: window.is_key_pressed(KeyboardKey::KEY_SPACE),
        interact: window.is_key_pressed(KeyboardKey::KEY_E),
        regenerate: window.is_key_pressed(KeyboardKey::KEY_R),
        cycle_weapon: window.is_key_pressed(KeyboardKey::KEY_Q),
        sensitivity_up: window.is_key_pressed(KeyboardKey::KEY_EQUAL)
            || window.is_key_pressed(KeyboardKey::KEY_KP_ADD),
        sensitivity_down: window.is_key_pressed(KeyboardKey::KEY_MINUS)
            || window.is_key_pressed(KeyboardKey::KEY_KP_SUBTRACT),
        debug_dump: window.is_key_pressed(KeyboardKey::KEY_F3),
        quit: window.is_key_pressed(KeyboardKey::KEY_ESCAPE) || window.window_should_close(),
        mouse_dx: mouse.x,
        mouse_dy: mouse.y,
    }
}

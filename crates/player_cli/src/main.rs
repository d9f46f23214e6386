//! CLI smoke entry point.
//!
//! Prints core linkage info and a validation probe; deterministic output.

use player_core::{validate_player_input, PlayerInput, DEFAULT_PLAYERS_KEY};

fn main() {
    println!("player_core ping={}", player_core::ping());
    println!("player_core version={}", player_core::core_version());
    println!("player_core storage_key={DEFAULT_PLAYERS_KEY}");

    let probe = PlayerInput::new("Ana", "ana@x.com", "abcdef", "abcdef");
    let status = match validate_player_input(&probe) {
        Ok(()) => "ok".to_string(),
        Err(errors) => errors.to_string(),
    };
    println!("player_core validation_probe={status}");
}

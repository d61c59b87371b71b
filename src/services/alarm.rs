//! Alert sound playback

use tokio::process::Command;
use tracing::{debug, info};

use crate::state::AlarmSound;

/// Play an alert sound.
///
/// With a player command configured, the command is run with the sound id
/// as its only argument. Without one, the terminal bell is rung.
pub async fn play_alarm(player: Option<&str>, sound: AlarmSound) -> Result<(), String> {
    let Some(player) = player else {
        debug!("No alarm player configured, ringing terminal bell");
        eprint!("\x07");
        return Ok(());
    };

    debug!("Playing {} alarm with {}", sound.as_str(), player);

    let output = Command::new(player)
        .arg(sound.as_str())
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", player, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} failed: {}", player, stderr.trim()));
    }

    info!("Played {} alarm", sound.as_str());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_player_reports_error() {
        let result = play_alarm(Some("/nonexistent/pomodoro-player"), AlarmSound::Bell).await;
        assert!(result.unwrap_err().contains("Failed to execute"));
    }

    #[tokio::test]
    async fn bell_fallback_succeeds() {
        assert!(play_alarm(None, AlarmSound::Soft).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_player_reports_error() {
        let result = play_alarm(Some("false"), AlarmSound::Bell).await;
        assert!(result.unwrap_err().starts_with("false failed"));
    }
}

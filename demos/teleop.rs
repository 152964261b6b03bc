// Keyboard teleop: WASD move, Z/X rotate, R/F speed, Q quit
// Publishes geometry Twist messages (JSON) on cmd_vel at ~50Hz.
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use mecanum_cmd_runtime::config::TOPIC_CMD_VEL;
use mecanum_cmd_runtime::messages::Twist;
use std::time::{Duration, Instant};
use tracing::info;

const SPEEDS: [f64; 3] = [0.1, 0.4, 1.0]; // m/s
const YAW_SPEEDS: [f64; 3] = [0.1, 0.3, 0.5]; // rad/s
const INPUT_TIMEOUT_MS: u64 = 100; // Reset velocities after this much time with no input

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_CMD_VEL).await?;

    info!("Controls: WASD=move, Z/X=rotate, R/F=speed, Q=quit");
    info!("Speed: LOW");

    enable_raw_mode()?;
    let result = run_teleop(&publisher).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(
    publisher: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut speed_idx: usize = 0;
    let mut twist = Twist::default();
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    KeyCode::Char('w') if pressed => twist.linear.x = SPEEDS[speed_idx],
                    KeyCode::Char('s') if pressed => twist.linear.x = -SPEEDS[speed_idx],
                    KeyCode::Char('a') if pressed => twist.linear.y = SPEEDS[speed_idx],
                    KeyCode::Char('d') if pressed => twist.linear.y = -SPEEDS[speed_idx],
                    KeyCode::Char('z') if pressed => twist.angular.z = YAW_SPEEDS[speed_idx],
                    KeyCode::Char('x') if pressed => twist.angular.z = -YAW_SPEEDS[speed_idx],

                    // Speed control
                    KeyCode::Char('r') if pressed => {
                        speed_idx = (speed_idx + 1).min(2);
                        print_speed(speed_idx);
                    }
                    KeyCode::Char('f') if pressed => {
                        speed_idx = speed_idx.saturating_sub(1);
                        print_speed(speed_idx);
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }

                if pressed && matches!(code, KeyCode::Char('w' | 's' | 'a' | 'd' | 'z' | 'x')) {
                    last_movement_input = Instant::now();
                }
            }
        }

        // Reset velocities if no movement input for INPUT_TIMEOUT_MS
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            twist = Twist::default();
        }

        publisher.put(serde_json::to_string(&twist)?).await?;
    }

    // Leave the base stopped
    publisher.put(serde_json::to_string(&Twist::default())?).await?;
    Ok(())
}

fn print_speed(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Speed: {}", label);
}

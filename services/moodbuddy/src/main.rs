mod camera;
mod classifier;
mod config;

use crate::camera::{FrameSource, SyntheticCamera};
use crate::classifier::StubClassifier;
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Parser;
use moodbuddy_core::chat::{ChatBackend, ChatConfig, GeminiChat};
use moodbuddy_core::conversation::{ConversationController, ConversationTurn, REPLY_DELAY, Speaker};
use moodbuddy_core::emotion::EmotionLabel;
use moodbuddy_core::sampler::{EmotionSampler, SAMPLE_INTERVAL};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::fmt::time::ChronoLocal;

/// How long the stub classifier pretends to spend downloading its model.
const MODEL_LOAD_SIMULATION: Duration = Duration::from_millis(1500);

/// Inputs funneled into the single event loop that owns all session state.
enum Input {
    /// The sampling timer fired; attempt one classification.
    SampleTick,
    /// The user submitted a line of text.
    UserLine(String),
    /// A chat backend call resolved for the tagged request generation.
    ReplyReady {
        generation: u64,
        outcome: Result<Option<String>>,
    },
    /// The user asked to start the session again.
    Reset,
    /// The user asked to leave.
    Quit,
}

#[derive(Parser)]
#[command(about = "Emotion-aware conversational assistant")]
struct Cli {
    /// Emotion the stub classifier should detect
    /// (happy, sad, angry, surprised, neutral, fearful, disgusted)
    #[arg(long, default_value = "neutral")]
    emotion: String,

    /// Number of "no face found" ticks before the stub classifier detects
    #[arg(long, default_value_t = 1)]
    warmup_ticks: u32,

    /// Override the sampling interval in milliseconds
    #[arg(long)]
    sample_interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    tracing::info!("Configuration loaded successfully. Starting moodbuddy service...");

    // --- 3. Parse Command-Line Arguments ---
    let args = Cli::parse();
    let scripted = EmotionLabel::parse(&args.emotion)
        .with_context(|| format!("--emotion '{}' is not a recognized label", args.emotion))?;
    let sample_interval = args
        .sample_interval_ms
        .map(Duration::from_millis)
        .unwrap_or(SAMPLE_INTERVAL);

    // --- 4. Initialize Adapters ---
    let chat: Arc<dyn ChatBackend> = Arc::new(
        GeminiChat::new(ChatConfig {
            api_key: config.gemini_api_key.clone(),
            model: config.chat_model.clone(),
            endpoint: config.chat_endpoint.clone(),
            timeout: config.chat_timeout,
        })
        .context("Failed to create chat backend")?,
    );

    let classifier = Arc::new(StubClassifier::new(scripted, args.warmup_ticks));
    let camera = SyntheticCamera::new();

    // Simulate the asynchronous model download; classification ticks are
    // silent no-ops until this completes.
    {
        let classifier = classifier.clone();
        tokio::spawn(async move {
            tokio::time::sleep(MODEL_LOAD_SIMULATION).await;
            classifier.finish_loading();
            tracing::info!("expression model loaded");
        });
    }

    // --- 5. Input Channels and Tasks ---
    let (input_tx, mut input_rx) = mpsc::channel::<Input>(64);
    spawn_stdin_reader(input_tx.clone());
    let mut ticker = Some(spawn_ticker(sample_interval, input_tx.clone()));

    // --- 6. Core Session State ---
    // Both state machines live in this task only; the ticker, stdin reader,
    // and reply tasks communicate exclusively through the input channel.
    let mut sampler = EmotionSampler::new();
    sampler.start();
    let mut controller = ConversationController::new();

    println!("🤖 Your Buddy — looking for your mood... (type /reset to start again, /quit to leave)");

    // --- 7. Event Loop ---
    while let Some(input) = input_rx.recv().await {
        match input {
            Input::SampleTick => {
                let frame = camera.current_frame();
                if let Some(label) = sampler.tick(classifier.as_ref(), frame.as_ref()).await {
                    // Detection is terminal: stop the sampling timer outright
                    // rather than letting it fire no-ops forever.
                    if let Some(handle) = ticker.take() {
                        handle.abort();
                    }
                    controller.on_emotion_detected(label);
                    if let Some(heading) = controller.heading() {
                        println!("\n{heading}");
                    }
                    if let Some(turn) = controller.transcript().last() {
                        print_turn(turn);
                    }
                }
            }
            Input::UserLine(text) => {
                let Some(outbound) = controller.begin_user_message(&text) else {
                    // Rejected submissions (empty, pending, not yet seeded)
                    // change nothing and need no user-visible error.
                    continue;
                };
                if let Some(turn) = controller.transcript().last() {
                    print_turn(turn);
                }
                let chat = chat.clone();
                let reply_tx = input_tx.clone();
                tokio::spawn(async move {
                    // Fixed artificial delay to smooth perceived latency.
                    tokio::time::sleep(REPLY_DELAY).await;
                    let outcome = chat.complete(&outbound.prompt).await;
                    let _ = reply_tx
                        .send(Input::ReplyReady {
                            generation: outbound.generation,
                            outcome,
                        })
                        .await;
                });
            }
            Input::ReplyReady {
                generation,
                outcome,
            } => {
                let before = controller.transcript().len();
                controller.complete_reply(generation, outcome);
                // Stale replies are dropped inside the controller; only
                // render when a turn was actually appended.
                if controller.transcript().len() > before {
                    if let Some(turn) = controller.transcript().last() {
                        print_turn(turn);
                    }
                }
            }
            Input::Reset => {
                sampler.reset();
                controller.reset();
                if let Some(handle) = ticker.take() {
                    handle.abort();
                }
                ticker = Some(spawn_ticker(sample_interval, input_tx.clone()));
                println!("\n🔄 Starting again — looking for your mood...");
            }
            Input::Quit => break,
        }
    }

    tracing::info!("moodbuddy service shutting down");
    Ok(())
}

/// Spawns the sampling timer. It only tells the event loop that time passed;
/// the sampler itself decides whether a tick does anything.
fn spawn_ticker(interval: Duration, input_tx: mpsc::Sender<Input>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first interval tick fires immediately; skip it so the cadence
        // starts one full interval after arming.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if input_tx.send(Input::SampleTick).await.is_err() {
                break;
            }
        }
    })
}

/// Reads user lines from stdin and relays them as inputs. `/reset` and
/// `/quit` are shell commands; everything else is a message submission.
fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let input = match line.trim() {
                        "/reset" => Input::Reset,
                        "/quit" => Input::Quit,
                        _ => Input::UserLine(line),
                    };
                    if input_tx.send(input).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    // stdin closed; treat as a quit.
                    let _ = input_tx.send(Input::Quit).await;
                    break;
                }
                Err(e) => {
                    tracing::warn!("failed to read from stdin: {e}");
                    break;
                }
            }
        }
    })
}

fn print_turn(turn: &ConversationTurn) {
    match turn.speaker {
        Speaker::User => println!("You: {}", turn.text),
        Speaker::Assistant => println!("Buddy: {}", turn.text),
    }
}

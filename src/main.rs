//! Application entry point — guided voice-interview wizard.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Intake: read the contact number from stdin, normalize, cache it.
//! 4. Microphone self-test: record a short window and require that the
//!    transcription service hears something.
//! 5. Pre-check confirmation (`y` to start).
//! 6. Build the collaborators and run the orchestrator event loop on the
//!    main thread until the session ends.
//!
//! The orchestrator future owns the cpal capture unit and is therefore
//! driven with `block_on` rather than spawned.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use voice_interview::{
    audio::{MicCapture, WaveformFrame},
    config::AppConfig,
    contact::{normalize_contact, ContactStore},
    conversation::HttpConversationClient,
    delivery::WebhookDelivery,
    interview::{
        run_self_test, InterviewCommand, InterviewEvent, InterviewOrchestrator, Phase,
    },
    speech::{AudioSink, HttpSynthesizer, RodioSink, SilentSink, SpeechPlayback},
    transcribe::HttpTranscriber,
};

// ---------------------------------------------------------------------------
// stdin helpers
// ---------------------------------------------------------------------------

/// Print `prompt` and read one trimmed line from stdin.
fn ask(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirmed(answer: &str) -> bool {
    matches!(answer, "y" | "Y")
}

// ---------------------------------------------------------------------------
// Waveform rendering
// ---------------------------------------------------------------------------

const BAR_GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render a waveform frame as one line of block glyphs.
fn render_waveform(frame: &WaveformFrame) -> String {
    frame
        .bars
        .iter()
        .map(|&level| {
            let idx = ((level * BAR_GLYPHS.len() as f32) as usize).min(BAR_GLYPHS.len() - 1);
            BAR_GLYPHS[idx]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Event printer
// ---------------------------------------------------------------------------

/// Consume orchestrator events until the session completes.
async fn print_events(mut event_rx: mpsc::Receiver<InterviewEvent>) {
    while let Some(event) = event_rx.recv().await {
        match event {
            InterviewEvent::PhaseChanged(phase) => {
                if phase != Phase::Recording {
                    println!("[{}]", phase.label());
                }
            }
            InterviewEvent::QuestionReady { number, text } => {
                println!("\n질문 {number}: {text}");
            }
            InterviewEvent::AnswerRecorded {
                text,
                duration_secs,
            } => {
                println!("\n답변 ({duration_secs:.1}초): {text}");
            }
            InterviewEvent::Waveform(frame) => {
                print!("\r{}", render_waveform(&frame));
                let _ = io::stdout().flush();
            }
            InterviewEvent::Error { message } => {
                println!("\n오류: {message}");
            }
            InterviewEvent::Completed { delivered } => {
                if delivered {
                    println!("\n면접이 끝났습니다. 기록이 전송되었습니다.");
                } else {
                    println!("\n면접이 끝났습니다. (기록 전송 실패)");
                }
                break;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("voice interview wizard starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    // 3. Intake — a blank entry is allowed and delivered as-is.
    println!("음성 면접을 준비합니다.\n");
    let store = ContactStore::new();
    let raw = ask("연락처를 입력하세요 (건너뛰려면 Enter): ")?;
    let entered = normalize_contact(&raw);
    if !entered.is_empty() {
        if let Err(e) = store.save(&entered) {
            log::warn!("could not cache the contact number: {e}");
        }
    }
    // The payload always reads from the cache, so a blank entry falls back
    // to the number captured on a previous run.
    let contact = store.load().unwrap_or(entered);
    if !contact.is_empty() {
        println!("연락처: {contact}\n");
    }

    let transcriber = Arc::new(HttpTranscriber::new(
        &config.services.base_url,
        config.services.timeout_secs,
        &config.services.model,
        &config.services.language,
    ));

    // 4. Microphone self-test
    let (waveform_tx, waveform_rx) = mpsc::channel(32);
    let mut capture = MicCapture::new(
        config.audio.sample_rate,
        config.audio.waveform_bars,
        waveform_tx,
    );

    loop {
        println!(
            "마이크 테스트: {}초 동안 아무 말이나 해보세요...",
            config.audio.self_test_secs
        );
        let window = Duration::from_secs(config.audio.self_test_secs);
        match rt.block_on(run_self_test(&mut capture, transcriber.as_ref(), window)) {
            Ok(report) => {
                println!("인식된 음성: {}\n", report.text);
                break;
            }
            Err(e) => {
                println!("마이크 테스트 실패: {e}");
                if !confirmed(&ask("다시 시도할까요? (y/N): ")?) {
                    return Ok(());
                }
            }
        }
    }

    // 5. Pre-check
    if !confirmed(&ask("면접을 시작할까요? (y/N): ")?) {
        return Ok(());
    }
    println!("녹음 시작: r / 녹음 종료: s / 면접 종료: q\n");

    // 6. Collaborators and orchestrator
    let synthesizer = Arc::new(HttpSynthesizer::new(
        &config.services.base_url,
        config.services.timeout_secs,
    ));
    let sink: Arc<dyn AudioSink> = match RodioSink::spawn() {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            log::warn!("no audio output ({e}); questions will be text-only");
            Arc::new(SilentSink)
        }
    };
    let speech = Arc::new(SpeechPlayback::new(synthesizer, sink));

    let conversation = Arc::new(HttpConversationClient::new(
        &config.services.base_url,
        config.services.timeout_secs,
        Duration::from_secs(config.interview.poll_interval_secs),
        config.interview.poll_ceiling,
    ));
    let delivery = Arc::new(WebhookDelivery::new(
        &config.webhook.url,
        config.webhook.timeout_secs,
    ));

    let (cmd_tx, cmd_rx) = mpsc::channel::<InterviewCommand>(16);
    let (event_tx, event_rx) = mpsc::channel::<InterviewEvent>(64);

    let orchestrator = InterviewOrchestrator::new(
        Box::new(capture),
        speech,
        transcriber,
        conversation,
        delivery,
        contact,
        config.interview.seed_prompt.clone(),
        waveform_rx,
        event_tx,
    );

    // Keyboard commands come from a plain thread so the event loop never
    // blocks on stdin.
    {
        let cmd_tx = cmd_tx.clone();
        std::thread::Builder::new()
            .name("stdin-commands".into())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    let cmd = match line.trim() {
                        "r" => InterviewCommand::StartRecording,
                        "s" => InterviewCommand::StopRecording,
                        "q" => InterviewCommand::End,
                        _ => continue,
                    };
                    let quitting = cmd == InterviewCommand::End;
                    if cmd_tx.blocking_send(cmd).is_err() || quitting {
                        break;
                    }
                }
                // stdin closed: end the session rather than leaving it open
                let _ = cmd_tx.blocking_send(InterviewCommand::End);
            })?;
    }

    rt.block_on(async {
        let _ = cmd_tx.send(InterviewCommand::Begin).await;
        // The orchestrator future owns the capture unit, so it runs here on
        // the main thread alongside the printer.
        tokio::join!(orchestrator.run(cmd_rx), print_events(event_rx));
    });

    Ok(())
}

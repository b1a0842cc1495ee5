//! A terminal demo of the travel planner with typed input standing in
//! for the microphone.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;
use voxtrip::SessionBuilder;
use voxtrip::core::SessionPhase;
use voxtrip::core::conversation::{Speaker, TranscriptMessage};
use voxtrip::typed::typed_transcription;
use voxtrip_itinerary::{
    GeneratorConfigBuilder, HttpGenerator, Itinerary, ItineraryStore,
};

enum PlannerEvent {
    Message(TranscriptMessage),
    Phase(SessionPhase),
    Error(String),
    Itinerary(Itinerary),
}

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(base_url) = env::var("ITINERARY_API_URL") else {
        eprintln!("ITINERARY_API_URL environment variable is not set");
        return;
    };
    let store_path = env::var("ITINERARY_STORE_PATH")
        .unwrap_or_else(|_| "itineraries.json".to_owned());

    let config = GeneratorConfigBuilder::with_base_url(base_url).build();
    let generator = HttpGenerator::new(config);
    let (input, transcription) = typed_transcription();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let session = SessionBuilder::with_providers(transcription, generator)
        .with_store(ItineraryStore::new(store_path))
        .on_message({
            let event_tx = event_tx.clone();
            move |msg| {
                event_tx.send(PlannerEvent::Message(msg.clone())).ok();
            }
        })
        .on_phase_change({
            let event_tx = event_tx.clone();
            move |phase| {
                event_tx.send(PlannerEvent::Phase(phase)).ok();
            }
        })
        .on_error({
            let event_tx = event_tx.clone();
            move |err| {
                event_tx.send(PlannerEvent::Error(err.to_string())).ok();
            }
        })
        .build();

    let mut itineraries = session.subscribe();
    tokio::spawn({
        let event_tx = event_tx.clone();
        async move {
            while let Ok(itinerary) = itineraries.recv().await {
                event_tx.send(PlannerEvent::Itinerary(itinerary)).ok();
            }
        }
    });

    session.start();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    let mut phase = SessionPhase::Disconnected;

    'outer: loop {
        let mut progress_bar = None;

        loop {
            // Show a spinner while the itinerary is being generated.
            if phase == SessionPhase::Processing {
                progress_bar
                    .get_or_insert_with(|| {
                        let progress_bar = ProgressBar::new_spinner();
                        progress_bar.set_style(progress_style.clone());
                        progress_bar
                            .set_message("🗺️  Creating your itinerary...");
                        progress_bar
                    })
                    .inc(1);
            }

            let sleep = sleep(Duration::from_millis(100));
            let event = select! {
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        break 'outer;
                    };
                    event
                },
                _ = sleep => {
                    continue;
                }
            };

            // Finish the progress bar before printing anything else.
            if let Some(progress_bar) = &progress_bar {
                progress_bar.finish_and_clear();
            }
            progress_bar = None;

            match event {
                PlannerEvent::Message(msg) => {
                    if msg.speaker() == Speaker::Agent {
                        println!(
                            "{}🤖 {}",
                            BAR_CHAR.bright_cyan(),
                            msg.text().bright_white()
                        );
                        // The agent is waiting for a reply.
                        if phase == SessionPhase::Listening {
                            break;
                        }
                    }
                }
                PlannerEvent::Phase(new_phase) => {
                    phase = new_phase;
                    if phase == SessionPhase::Listening {
                        break;
                    }
                }
                PlannerEvent::Error(err) => {
                    println!(
                        "{}⚠️  {}",
                        BAR_CHAR.bright_yellow(),
                        err.bright_white()
                    );
                }
                PlannerEvent::Itinerary(itinerary) => {
                    print_itinerary(&itinerary);
                    break 'outer;
                }
            }
        }

        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        input.submit_line(&line);
    }

    session.stop();
}

fn print_itinerary(itinerary: &Itinerary) {
    let bar = BAR_CHAR.bright_green();
    println!(
        "\n{bar}✈️  Your itinerary for {} is ready!",
        itinerary.location.bright_white().bold()
    );
    println!(
        "{bar}{} - {}",
        itinerary.start_date, itinerary.end_date
    );
    for event in &itinerary.events {
        println!(
            "{bar}{} {} ({})",
            event.time,
            event.title.bright_white(),
            event.location
        );
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}

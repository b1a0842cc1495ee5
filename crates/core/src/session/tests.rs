use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::{env, fs, process};

use chrono::Local;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use voxtrip_itinerary::ItineraryStore;
use voxtrip_testkit::{PresetGenerator, ScriptedTranscription};

use crate::conversation::Speaker;
use crate::dates;
use crate::{SessionBuilder, SessionPhase};

fn phase_probe() -> (
    watch::Sender<Option<SessionPhase>>,
    watch::Receiver<Option<SessionPhase>>,
) {
    watch::channel(None)
}

async fn wait_for_phase(
    rx: &mut watch::Receiver<Option<SessionPhase>>,
    phase: SessionPhase,
) {
    timeout(Duration::from_secs(5), rx.wait_for(|p| *p == Some(phase)))
        .await
        .unwrap()
        .unwrap();
}

fn temp_store(tag: &str) -> ItineraryStore {
    let path = env::temp_dir()
        .join(format!("voxtrip-session-{tag}-{}.json", process::id()));
    fs::remove_file(&path).ok();
    ItineraryStore::new(path)
}

#[tokio::test]
async fn test_complete_conversation() {
    let mut transcription = ScriptedTranscription::default();
    transcription.add_utterance(["I want to visit Tokyo"]);
    transcription.add_utterance(["from December 1st to December 10th"]);

    let generator = PresetGenerator::default();
    let store = temp_store("complete");
    let (phase_tx, mut phase_rx) = phase_probe();

    let session =
        SessionBuilder::with_providers(transcription, generator.clone())
            .with_store(store.clone())
            .on_phase_change(move |phase| {
                phase_tx.send(Some(phase)).ok();
            })
            .build();
    let mut itineraries = session.subscribe();
    session.start();

    wait_for_phase(&mut phase_rx, SessionPhase::Completed).await;
    assert_eq!(generator.call_count(), 1);

    let itinerary = timeout(Duration::from_secs(1), itineraries.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(itinerary.location, "Tokyo");

    let today = Local::now().date_naive();
    let expected_start = dates::normalize("December 1", today).unwrap();
    assert_eq!(itinerary.start_date, expected_start.to_string());

    // The itinerary was persisted before it was broadcast.
    let persisted = store.load();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].location, "Tokyo");
    fs::remove_file(store.path()).ok();
}

#[tokio::test]
async fn test_repeated_details_generate_once() {
    let mut transcription = ScriptedTranscription::default();
    transcription.add_utterance([
        "I want to visit Tokyo from December 1st to December 10th",
    ]);
    transcription.add_utterance([
        "I want to visit Tokyo from December 1st to December 10th",
    ]);

    let generator = PresetGenerator::default();
    let (phase_tx, mut phase_rx) = phase_probe();

    let session =
        SessionBuilder::with_providers(transcription, generator.clone())
            .on_phase_change(move |phase| {
                phase_tx.send(Some(phase)).ok();
            })
            .build();
    session.start();

    wait_for_phase(&mut phase_rx, SessionPhase::Completed).await;
    // The second utterance was delivered after generation began and must
    // not trigger another request.
    sleep(Duration::from_millis(100)).await;
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn test_final_fragments_surface_as_user_messages() {
    let mut transcription = ScriptedTranscription::default();
    transcription.add_utterance(["I want", "to visit Paris"]);

    let generator = PresetGenerator::default();
    let (phase_tx, mut phase_rx) = phase_probe();
    let messages = Arc::new(Mutex::new(Vec::<(Speaker, String)>::new()));

    let session =
        SessionBuilder::with_providers(transcription, generator.clone())
            .on_message({
                let messages = Arc::clone(&messages);
                move |msg| {
                    messages
                        .lock()
                        .unwrap()
                        .push((msg.speaker(), msg.text().to_owned()));
                }
            })
            .on_phase_change(move |phase| {
                phase_tx.send(Some(phase)).ok();
            })
            .build();
    session.start();

    wait_for_phase(&mut phase_rx, SessionPhase::Disconnected).await;

    let messages = messages.lock().unwrap();
    let user_texts: Vec<&str> = messages
        .iter()
        .filter(|(speaker, _)| *speaker == Speaker::User)
        .map(|(_, text)| text.as_str())
        .collect();
    // One user message per final fragment, as the speech arrives, not a
    // single joined message at the end of the utterance.
    assert_eq!(user_texts, ["I want", "to visit Paris"]);
    // Extraction still sees the fragments joined as one utterance.
    assert!(
        messages
            .iter()
            .any(|(speaker, text)| *speaker == Speaker::Agent
                && text.contains("Paris"))
    );
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_incomplete_details_prompt_for_more() {
    let mut transcription = ScriptedTranscription::default();
    transcription.add_utterance(["I want to visit Paris"]);

    let generator = PresetGenerator::default();
    let (phase_tx, mut phase_rx) = phase_probe();
    let agent_messages = Arc::new(Mutex::new(Vec::<String>::new()));

    let session =
        SessionBuilder::with_providers(transcription, generator.clone())
            .on_message({
                let agent_messages = Arc::clone(&agent_messages);
                move |msg| {
                    if msg.speaker() == Speaker::Agent {
                        agent_messages
                            .lock()
                            .unwrap()
                            .push(msg.text().to_owned());
                    }
                }
            })
            .on_phase_change(move |phase| {
                phase_tx.send(Some(phase)).ok();
            })
            .build();
    session.start();

    // The script runs out, so the stream closes and the session drops
    // back to disconnected without ever generating.
    wait_for_phase(&mut phase_rx, SessionPhase::Disconnected).await;
    assert_eq!(generator.call_count(), 0);

    let agent_messages = agent_messages.lock().unwrap();
    assert!(
        agent_messages
            .iter()
            .any(|text| text.contains("Paris") && text.contains("dates"))
    );
}

#[tokio::test]
async fn test_generation_failure_reconnects_and_retries() {
    let mut transcription = ScriptedTranscription::default();
    transcription.add_utterance([
        "I want to visit Tokyo from December 1st to December 10th",
    ]);

    let generator = PresetGenerator::default().with_failures(1);
    let (phase_tx, mut phase_rx) = phase_probe();
    let (error_tx, mut error_rx) = watch::channel(false);

    let session =
        SessionBuilder::with_providers(transcription, generator.clone())
            .on_error(move |_| {
                error_tx.send(true).ok();
            })
            .on_phase_change(move |phase| {
                phase_tx.send(Some(phase)).ok();
            })
            .build();
    session.start();

    // The reopened stream replays the script, so the second attempt
    // succeeds.
    wait_for_phase(&mut phase_rx, SessionPhase::Completed).await;
    assert_eq!(generator.call_count(), 2);

    timeout(Duration::from_secs(1), error_rx.wait_for(|v| *v))
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_stop_suppresses_in_flight_generation() {
    let mut transcription = ScriptedTranscription::default();
    transcription.add_utterance([
        "I want to visit Tokyo from December 1st to December 10th",
    ]);

    let generator =
        PresetGenerator::default().with_delay(Duration::from_millis(200));
    let (phase_tx, mut phase_rx) = phase_probe();

    let session =
        SessionBuilder::with_providers(transcription, generator.clone())
            .on_phase_change(move |phase| {
                phase_tx.send(Some(phase)).ok();
            })
            .build();
    let mut itineraries = session.subscribe();
    session.start();

    wait_for_phase(&mut phase_rx, SessionPhase::Processing).await;
    session.stop();

    // Let the delayed generation resolve; its result must be discarded.
    sleep(Duration::from_millis(400)).await;
    assert_eq!(*phase_rx.borrow(), Some(SessionPhase::Disconnected));
    assert!(itineraries.try_recv().is_err());
}

#[tokio::test]
async fn test_stop_while_listening() {
    let mut transcription = ScriptedTranscription::default();
    transcription.set_delay(Duration::from_millis(100));
    transcription.add_utterance([
        "I want to visit Tokyo from December 1st to December 10th",
    ]);

    let generator = PresetGenerator::default();
    let (phase_tx, mut phase_rx) = phase_probe();

    let session =
        SessionBuilder::with_providers(transcription, generator.clone())
            .on_phase_change(move |phase| {
                phase_tx.send(Some(phase)).ok();
            })
            .build();
    session.start();

    wait_for_phase(&mut phase_rx, SessionPhase::Listening).await;
    session.stop();

    sleep(Duration::from_millis(400)).await;
    assert_eq!(*phase_rx.borrow(), Some(SessionPhase::Disconnected));
    assert_eq!(generator.call_count(), 0);
}

//! Microphone filtering and live/muted aggregation.

use std::future::Future;
use std::time::Duration;

use tracing::trace;

use crate::{ControlSession, MicInput, ObsError, Result};

/// Substrings of OBS input kinds that capture from an OS audio device.
pub const MIC_KIND_MARKERS: [&str; 6] = [
    "wasapi_input",
    "pulse_input",
    "coreaudio_input",
    "alsa_input",
    "jack_input",
    "audio_input",
];

/// Whether an input kind is an audio capture source.
pub fn is_mic_kind(kind: &str) -> bool {
    MIC_KIND_MARKERS.iter().any(|marker| kind.contains(marker))
}

/// Live iff there is at least one mic and none of them is muted.
///
/// An empty set reports muted.
pub fn aggregate_live<I>(muted_flags: I) -> bool
where
    I: IntoIterator<Item = bool>,
{
    let mut flags = muted_flags.into_iter().peekable();
    flags.peek().is_some() && flags.all(|muted| !muted)
}

/// Runs `fut` with a deadline; expiry becomes [`ObsError::Timeout`].
pub(crate) async fn bounded<T>(
    what: &'static str,
    timeout: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| ObsError::Timeout(what, timeout))?
}

/// One full poll: list inputs, keep the mics, query every mute flag, then
/// aggregate the snapshot.
///
/// Every mic is queried regardless of earlier answers, so any failing call
/// fails the whole poll no matter where the mic sits in the list.
pub async fn poll_live<S>(session: &mut S, call_timeout: Duration) -> Result<bool>
where
    S: ControlSession + ?Sized,
{
    let inputs = bounded("GetInputList", call_timeout, session.list_inputs()).await?;
    let mics: Vec<MicInput> = inputs
        .into_iter()
        .filter(|input| is_mic_kind(&input.kind))
        .collect();
    trace!(mics = mics.len(), "polling mute state");

    let mut muted = Vec::with_capacity(mics.len());
    for mic in &mics {
        muted.push(bounded("GetInputMute", call_timeout, session.input_muted(&mic.name)).await?);
    }
    Ok(aggregate_live(muted))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;

    #[test]
    fn test_is_mic_kind() {
        assert!(is_mic_kind("wasapi_input_capture"));
        assert!(is_mic_kind("pulse_input_capture"));
        assert!(is_mic_kind("coreaudio_input_capture"));
        assert!(is_mic_kind("alsa_input_capture"));
        assert!(is_mic_kind("jack_input_client"));
        assert!(!is_mic_kind("wasapi_output_capture"));
        assert!(!is_mic_kind("browser_source"));
        assert!(!is_mic_kind(""));
    }

    #[test]
    fn test_aggregate_empty_is_muted() {
        assert!(!aggregate_live(Vec::<bool>::new()));
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let flags = [false, false, true, false];
        // every rotation of the same set gives the same answer
        for shift in 0..flags.len() {
            let mut rotated = flags;
            rotated.rotate_left(shift);
            assert!(!aggregate_live(rotated));
        }
        assert!(aggregate_live([false, false, false]));
        assert!(aggregate_live([false]));
        assert!(!aggregate_live([true]));
    }

    /// Fake session: inputs plus a per-name mute answer; names mapped to
    /// `None` fail their query.
    struct FakeSession {
        inputs: Vec<MicInput>,
        mutes: HashMap<String, Option<bool>>,
        queried: Vec<String>,
    }

    impl FakeSession {
        fn new(mics: &[(&str, &str, Option<bool>)]) -> Self {
            Self {
                inputs: mics
                    .iter()
                    .map(|(name, kind, _)| MicInput::new(*name, *kind))
                    .collect(),
                mutes: mics
                    .iter()
                    .map(|(name, _, muted)| (name.to_string(), *muted))
                    .collect(),
                queried: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl ControlSession for FakeSession {
        async fn list_inputs(&mut self) -> Result<Vec<MicInput>> {
            Ok(self.inputs.clone())
        }

        async fn input_muted(&mut self, name: &str) -> Result<bool> {
            self.queried.push(name.to_string());
            self.mutes
                .get(name)
                .copied()
                .flatten()
                .ok_or(ObsError::Closed)
        }

        async fn close(&mut self) {}
    }

    const TIMEOUT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_poll_all_unmuted_is_live() {
        let mut session = FakeSession::new(&[
            ("Mic1", "wasapi_input_capture", Some(false)),
            ("Mic2", "wasapi_input_capture", Some(false)),
        ]);
        assert!(poll_live(&mut session, TIMEOUT).await.unwrap());
        assert_eq!(session.queried, vec!["Mic1", "Mic2"]);
    }

    #[tokio::test]
    async fn test_poll_ignores_non_mic_inputs() {
        let mut session = FakeSession::new(&[
            ("Desktop", "wasapi_output_capture", Some(true)),
            ("Mic1", "pulse_input_capture", Some(false)),
        ]);
        assert!(poll_live(&mut session, TIMEOUT).await.unwrap());
        assert_eq!(session.queried, vec!["Mic1"]);
    }

    #[tokio::test]
    async fn test_poll_no_mics_is_muted() {
        let mut session = FakeSession::new(&[("Browser", "browser_source", Some(false))]);
        assert!(!poll_live(&mut session, TIMEOUT).await.unwrap());
        assert!(session.queried.is_empty());
    }

    #[tokio::test]
    async fn test_poll_queries_every_mic() {
        let mut session = FakeSession::new(&[
            ("Mic1", "wasapi_input_capture", Some(true)),
            ("Mic2", "wasapi_input_capture", Some(false)),
        ]);
        assert!(!poll_live(&mut session, TIMEOUT).await.unwrap());
        assert_eq!(session.queried, vec!["Mic1", "Mic2"]);
    }

    #[tokio::test]
    async fn test_poll_result_is_order_independent() {
        let mics = [
            ("Mic1", "wasapi_input_capture", Some(false)),
            ("Mic2", "wasapi_input_capture", Some(true)),
            ("Mic3", "pulse_input_capture", Some(false)),
        ];
        for shift in 0..mics.len() {
            let mut rotated = mics;
            rotated.rotate_left(shift);
            let mut session = FakeSession::new(&rotated);
            assert!(!poll_live(&mut session, TIMEOUT).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_broken_mic_fails_poll_in_any_position() {
        let muted = ("Muted", "wasapi_input_capture", Some(true));
        let broken = ("Broken", "wasapi_input_capture", None);

        for mics in [[muted, broken], [broken, muted]] {
            let mut session = FakeSession::new(&mics);
            let result = poll_live(&mut session, TIMEOUT).await;
            assert!(matches!(result, Err(ObsError::Closed)), "{mics:?}");
        }
    }

    #[tokio::test]
    async fn test_poll_single_failure_fails_whole_poll() {
        let mut session = FakeSession::new(&[
            ("Mic1", "wasapi_input_capture", Some(false)),
            ("Mic2", "wasapi_input_capture", None),
            ("Mic3", "wasapi_input_capture", Some(false)),
        ]);
        let result = poll_live(&mut session, TIMEOUT).await;
        assert!(matches!(result, Err(ObsError::Closed)));
        assert_eq!(session.queried, vec!["Mic1", "Mic2"]);
    }

    struct HangingSession;

    #[async_trait]
    impl ControlSession for HangingSession {
        async fn list_inputs(&mut self) -> Result<Vec<MicInput>> {
            std::future::pending().await
        }

        async fn input_muted(&mut self, _name: &str) -> Result<bool> {
            std::future::pending().await
        }

        async fn close(&mut self) {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_times_out() {
        let result = poll_live(&mut HangingSession, TIMEOUT).await;
        assert!(matches!(
            result,
            Err(ObsError::Timeout("GetInputList", t)) if t == TIMEOUT
        ));
    }
}

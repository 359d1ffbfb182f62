//! The exact call sequence a sink observes, checked with a mockall sink.

mod common;

use std::sync::Arc;

use common::{FailingEngine, ScriptedEngine, UnavailableProvider, loud, session_for};
use mockall::predicate::eq;
use mockall::{Sequence, mock};
use ttsbridge_core::{AudioFormat, AudioSink, FailureKind, SinkError, SynthesisRequest};
use ttsbridge_stream::{Outcome, StreamConfig, SynthesisSession};

mock! {
    pub Sink {}

    impl AudioSink for Sink {
        fn max_chunk_bytes(&self) -> usize;
        fn start(&mut self, format: AudioFormat) -> Result<(), SinkError>;
        fn deliver(&mut self, buffer: &[u8], offset: usize, length: usize) -> Result<(), SinkError>;
        fn complete(&mut self);
        fn fail(&mut self, kind: FailureKind);
    }
}

fn request(text: &str) -> SynthesisRequest {
    SynthesisRequest::new(text, 0, 1.0)
}

#[test]
fn start_then_data_then_complete() {
    let mut sink = MockSink::new();
    let mut seq = Sequence::new();
    sink.expect_max_chunk_bytes().return_const(4096_usize);
    sink.expect_start()
        .with(eq(AudioFormat::pcm16_mono(16_000)))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    sink.expect_deliver()
        .withf(|_, offset, length| *offset == 0 && *length == 200)
        .times(2)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(()));
    sink.expect_complete().times(1).in_sequence(&mut seq).return_const(());
    sink.expect_fail().never();

    let engine = Arc::new(ScriptedEngine::new(16_000, vec![loud(100), loud(100)]));
    let session = session_for(engine, StreamConfig::default());
    let report = session.synthesize(&request("two chunks"), &mut sink);
    assert_eq!(report.outcome, Outcome::Completed);
}

#[test]
fn unavailable_engine_only_fails() {
    let mut sink = MockSink::new();
    sink.expect_start().never();
    sink.expect_deliver().never();
    sink.expect_complete().never();
    sink.expect_fail()
        .with(eq(FailureKind::EngineUnavailable))
        .times(1)
        .return_const(());

    let session = SynthesisSession::new(Arc::new(UnavailableProvider), StreamConfig::default());
    session.synthesize(&request("hello"), &mut sink);
}

#[test]
fn blank_text_starts_and_completes() {
    let mut sink = MockSink::new();
    let mut seq = Sequence::new();
    sink.expect_start()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    sink.expect_complete().times(1).in_sequence(&mut seq).return_const(());
    sink.expect_deliver().never();
    sink.expect_fail().never();

    let engine = Arc::new(ScriptedEngine::new(16_000, vec![loud(100)]));
    let session = session_for(engine, StreamConfig::default());
    session.synthesize(&request(""), &mut sink);
}

#[test]
fn generation_fault_fails_after_data() {
    let mut sink = MockSink::new();
    let mut seq = Sequence::new();
    sink.expect_max_chunk_bytes().return_const(4096_usize);
    sink.expect_start()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    sink.expect_deliver()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(()));
    sink.expect_fail()
        .with(eq(FailureKind::Synthesis))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    sink.expect_complete().never();

    let engine = Arc::new(FailingEngine {
        chunks: vec![loud(64)],
    });
    let session = session_for(engine, StreamConfig::default());
    let report = session.synthesize(&request("doomed"), &mut sink);
    assert_eq!(report.outcome, Outcome::Failed(FailureKind::Synthesis));
}

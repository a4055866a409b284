use crate::e2e::helpers;

use helpers::fixtures::{
    fake_audio, long_article, SHORT_CHUNK_LENGTH, SINGLE_SENTENCE, THREE_CHUNKS, THREE_SENTENCES,
};
use helpers::{FakeTtsRepository, TestContext};
use narrator::domain::tts::{InputIdentifier, SessionReport, TtsServiceApi, TtsServiceError};
use narrator::infrastructure::repositories::{FileProgressRepository, ProgressRepository};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[tokio::test]
async fn it_should_synthesize_every_chunk_and_merge_them() {
    let ctx = TestContext::with_memory_progress(SHORT_CHUNK_LENGTH).unwrap();
    let id = InputIdentifier::for_text(THREE_SENTENCES);

    let report = ctx.service().run_session(THREE_SENTENCES, &id).await.unwrap();

    let SessionReport::Completed {
        output,
        chunk_count,
        synthesized,
        resumed,
    } = report
    else {
        panic!("expected a completed session");
    };
    assert_eq!((chunk_count, synthesized, resumed), (3, 3, 0));
    assert_eq!(ctx.tts_repo.calls(), THREE_CHUNKS.to_vec());
    assert_eq!(ctx.concat_tool.calls(), 1);

    // Progress is saved after every chunk and cleared at the end
    let history: Vec<Vec<usize>> = ctx
        .saved_history()
        .iter()
        .map(|record| record.completed_indices.iter().copied().collect())
        .collect();
    assert_eq!(history, vec![vec![], vec![0], vec![0, 1], vec![0, 1, 2]]);
    assert!(ctx.progress_repo().load().await.is_empty());

    // Only the merged output is left behind
    let expected: Vec<u8> = THREE_CHUNKS.iter().flat_map(|c| fake_audio(c)).collect();
    assert_eq!(std::fs::read(&output).unwrap(), expected);
    assert_eq!(ctx.files(), ctx.output_files());
    assert_eq!(ctx.output_files().len(), 1);
    assert!(ctx.output_files()[0].ends_with(".mp3"));
}

#[tokio::test]
async fn it_should_rename_a_single_chunk_without_concatenating() {
    let ctx = TestContext::new(SHORT_CHUNK_LENGTH).unwrap();
    let id = InputIdentifier::for_text(SINGLE_SENTENCE);

    let report = ctx.service().run_session(SINGLE_SENTENCE, &id).await.unwrap();

    let SessionReport::Completed { output, .. } = report else {
        panic!("expected a completed session");
    };
    assert_eq!(ctx.concat_tool.calls(), 0);
    assert_eq!(std::fs::read(&output).unwrap(), fake_audio(SINGLE_SENTENCE));
    assert!(!ctx.artifact_path(0, "mp3").exists());
    assert!(!ctx.progress_path().exists());
    assert_eq!(ctx.files().len(), 1);
}

#[tokio::test]
async fn it_should_do_nothing_for_blank_text() {
    let ctx = TestContext::new(SHORT_CHUNK_LENGTH).unwrap();

    let report = ctx.service().run_session("  \n\t ", "input_blank").await.unwrap();

    assert_eq!(report, SessionReport::NothingToDo);
    assert!(ctx.tts_repo.calls().is_empty());
    assert!(ctx.files().is_empty());
}

#[tokio::test]
async fn it_should_split_a_long_article_within_the_provider_limit() {
    let ctx = TestContext::new(4500).unwrap();
    let article = long_article();
    let id = InputIdentifier::for_text(&article);

    let report = ctx.service().run_session(&article, &id).await.unwrap();

    assert!(matches!(report, SessionReport::Completed { chunk_count: 3, .. }));
    let calls = ctx.tts_repo.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|chunk| chunk.chars().count() <= 4500));
    assert!(calls.iter().all(|chunk| chunk.ends_with('.')));

    let spoken: String = calls.concat().chars().filter(|c| !c.is_whitespace()).collect();
    let original: String = article.chars().filter(|c| !c.is_whitespace()).collect();
    assert_eq!(spoken, original);
}

#[tokio::test]
async fn it_should_wrap_raw_pcm_into_wav() {
    let mut ctx = TestContext::new(SHORT_CHUNK_LENGTH).unwrap();
    ctx.tts_repo = Arc::new(FakeTtsRepository::with_mime_type(
        "audio/L16;codec=pcm;rate=24000",
    ));

    let report = ctx
        .service()
        .run_session(SINGLE_SENTENCE, "input_pcm")
        .await
        .unwrap();

    let SessionReport::Completed { output, .. } = report else {
        panic!("expected a completed session");
    };
    assert_eq!(output.extension().and_then(|e| e.to_str()), Some("wav"));

    let bytes = std::fs::read(&output).unwrap();
    let payload = fake_audio(SINGLE_SENTENCE);
    assert_eq!(bytes.len(), 44 + payload.len());
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
    assert_eq!(u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]), 24000);
    assert_eq!(&bytes[44..], payload.as_slice());
}

#[tokio::test]
async fn it_should_cap_chunks_at_the_provider_request_limit() {
    // Configured far above what the provider accepts in one request
    let mut ctx = TestContext::new(4500).unwrap();
    ctx.tts_repo = Arc::new(FakeTtsRepository::new().with_max_input_chars(SHORT_CHUNK_LENGTH));
    let service = ctx.service();
    assert_eq!(service.max_chunk_length(), SHORT_CHUNK_LENGTH);

    let id = InputIdentifier::for_text(THREE_SENTENCES);
    let report = service.run_session(THREE_SENTENCES, &id).await.unwrap();

    assert_eq!(ctx.tts_repo.calls(), THREE_CHUNKS.to_vec());
    assert!(matches!(report, SessionReport::Completed { chunk_count: 3, .. }));
}

#[tokio::test]
async fn it_should_keep_artifacts_when_concatenation_fails_and_retry_it() {
    let ctx = TestContext::new(SHORT_CHUNK_LENGTH).unwrap();
    let id = InputIdentifier::for_text(THREE_SENTENCES);
    ctx.concat_tool.set_failing(true);

    let err = ctx
        .service()
        .run_session(THREE_SENTENCES, &id)
        .await
        .unwrap_err();

    assert!(matches!(err, TtsServiceError::Concat(_)));
    assert!(err.is_resumable());
    let record = FileProgressRepository::new(ctx.progress_path()).load().await;
    assert_eq!(record.completed_count(), 3);
    for index in 0..3 {
        assert!(ctx.artifact_path(index, "mp3").exists());
    }
    assert!(ctx.output_files().is_empty());

    // Retry only merges, every chunk is already done
    ctx.concat_tool.set_failing(false);
    ctx.tts_repo.reset_calls();
    let report = ctx.service().run_session(THREE_SENTENCES, &id).await.unwrap();

    assert!(matches!(
        report,
        SessionReport::Completed {
            synthesized: 0,
            resumed: 3,
            ..
        }
    ));
    assert!(ctx.tts_repo.calls().is_empty());
    assert_eq!(ctx.output_files().len(), 1);
    assert!(!ctx.progress_path().exists());
}

/// Three sentences that split into exactly three chunks at `SHORT_CHUNK_LENGTH`
pub const THREE_SENTENCES: &str =
    "Alpha is the first part. Beta is the second part. Gamma is the third part.";

pub const THREE_CHUNKS: [&str; 3] = [
    "Alpha is the first part.",
    "Beta is the second part.",
    "Gamma is the third part.",
];

pub const SHORT_CHUNK_LENGTH: usize = 30;

pub const SINGLE_SENTENCE: &str = "Only one short sentence.";

/// 204 sentences of 50 characters, about 10,400 characters in total
pub fn long_article() -> String {
    (0..204)
        .map(|i| format!("Sentence {:03} keeps the long narration input going.", i))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bytes the fake provider returns for a chunk
pub fn fake_audio(chunk: &str) -> Vec<u8> {
    format!("[{}]", chunk).into_bytes()
}

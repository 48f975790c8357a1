//! System prompts for the LLM-backed OCR service.
//!
//! Callers can override either prompt via
//! [`crate::config::VisionConfig::ocr_prompt`] and
//! [`crate::config::VisionConfig::assistant_prompt`]; the constants here are
//! used only when no override is provided.

/// Default system prompt for transcribing an image.
pub const OCR_SYSTEM_PROMPT: &str = r#"You are an OCR engine. Transcribe every piece of text visible in the image.

Rules:
1. Preserve the text exactly as written, including punctuation, casing and numbers.
2. Keep the reading order a human would use; separate paragraphs and lines with newlines.
3. Keep the layout of lists and tables using plain text alignment.
4. Do NOT describe the image, translate, summarise or add commentary.
5. Do NOT wrap the output in code fences.
6. If the image contains no readable text, output nothing."#;

/// Default system prompt for the follow-up assistant.
pub const ASSISTANT_SYSTEM_PROMPT: &str = r#"You are a helpful assistant. The user will give you text that was extracted from an image with OCR.
Explain briefly what the text is, point out anything notable (dates, amounts, names, instructions),
and note any parts that look like OCR mistakes. Answer in the language of the text. Be concise."#;

/// Wrap the extracted text in the user turn sent to the assistant.
pub fn assistant_user_message(extracted: &str) -> String {
    format!(
        "Here is the text extracted from the image:\n\n\"\"\"{}\"\"\"",
        extracted
    )
}

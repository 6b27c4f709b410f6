// Shared prompt constants. Each engine that needs LLM calls defines its own
// prompts.rs alongside it. This file contains cross-cutting fragments.

/// Instruction appended to prompts whose output is user-facing Korean copy.
pub const KOREAN_OUTPUT_INSTRUCTION: &str =
    "모든 텍스트는 한글로 작성하고, 유효한 JSON 형식으로만 응답해주세요.";

// Shared prompt fragments. Each module that calls the LLM keeps its own
// prompts.rs alongside it; cross-cutting fragments live here.

/// Appended to every prompt that reads candidate data.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Use only the information present in the provided text. \
    Never invent names, employers, dates, skills, or qualifications. \
    If something is not stated, leave it out.";

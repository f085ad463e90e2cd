// Candidate re-ranking prompt templates.

pub const RERANK_SYSTEM: &str = "\
You are a senior technical recruiter. You compare candidate profiles against a job description \
and explain each judgement in one or two sentences. \
You MUST respond with valid JSON only. No markdown fences, no explanations outside the JSON.";

pub const RERANK_PROMPT: &str = r#"Rank the candidates below by how well they fit the job description.

For EVERY candidate return:
- "id": the candidate id exactly as given
- "score": relevance between 0.0 (no fit) and 1.0 (perfect fit)
- "reason": a short justification naming the matching and missing requirements

Judge on skills, experience, seniority and domain. The similarity value is only a retrieval hint.

{no_fabrication}

JOB DESCRIPTION:
{job_description}

CANDIDATES:
{candidates}

Respond with: {"rankings": [{"id": "...", "score": 0.0, "reason": "..."}]}"#;

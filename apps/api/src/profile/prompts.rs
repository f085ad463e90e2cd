// CV structuring prompt templates.

pub const STRUCTURE_CV_SYSTEM: &str = "\
You are an expert ATS (applicant tracking system) CV parser. \
Convert raw CV text into a single hierarchical JSON object. \
You MUST respond with valid JSON only. No markdown fences, no explanations.";

pub const STRUCTURE_CV_PROMPT: &str = r#"Convert the CV below into a structured JSON profile.

GUIDELINES:
- Output one JSON object with double-quoted keys and no trailing commas.
- Use nested objects and arrays where the data is hierarchical.
- Extract every detail that gives insight into the candidate. Do not summarise away information.
- Multi-page CVs: merge content from all pages without duplication.
- If a section is missing from the CV, omit it. Never emit empty keys, empty strings, or nulls.
- If the text is not a CV at all, return {"error": "<short reason>"}.

SECTIONS (use exactly these top-level keys when the data exists):
- "personal_info": {
    "full_name", "contacts": {"email", "phones", "social_media"},
    "address": {"street", "city", "postal_code", "country"},
    "nationality", "date_of_birth", "identifiers",
    "job_title" (current or most recent title, always required),
    "target_position" (role the candidate is seeking, always required),
    "seniority" (inferred for the target position, always required),
    "availability" (notice period, relocation, travel),
    "github_url"
  }
- "executive_summary": a complete professional overview: core competencies, years of experience,
  key achievements, career goals, unique strengths.
- "profile_insights": {
    "years_of_experience", "core_skills", "key_achievements", "career_objective",
    "global_experience", "career_trajectory", "market_alignment",
    "key_competencies", "unique_skillset", "professional_growth"
  }
- "technical_skills": languages, tools, frameworks, methodologies; include proficiency when stated.
- "professional_experience": [{"company", "role", "period", "responsibilities": [], "achievements": []}]
- "education": [{"degree", "institution", "graduation_date", "thesis", "certifications", "honors"}]
- "languages": [{"language", "level", "specialised_knowledge"}]
- "projects": at most the 4 most relevant projects, each
  {"name", "description", "technologies", "role", "impact", "repository_url"}.
  Use the GitHub projects below when they are relevant.
- "additional_info": hobbies, volunteering, publications, talks, awards, anything else relevant.

{no_fabrication}

CV TEXT:
{cv_text}

GITHUB PROJECTS:
{github_projects}

Return ONLY the JSON object."#;

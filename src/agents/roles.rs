//! Worker role descriptors
//!
//! The three pipeline roles differ only in data: a name, whether the role may
//! use the paper tools, and its instruction list. They are kept in one table
//! and consumed by the generic [`RoleRunner`](super::runner::RoleRunner).

/// Tools a role may call while answering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCapability {
    None,
    /// arXiv listing + full-text reading
    PaperSearch,
}

/// Immutable configuration bundle for one worker role
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerRole {
    pub name: &'static str,
    pub model: String,
    pub capability: ToolCapability,
    pub instructions: &'static [&'static str],
}

impl WorkerRole {
    /// Instructions rendered as a single system message
    pub fn system_prompt(&self) -> String {
        self.instructions.join("\n")
    }

    pub fn uses_tools(&self) -> bool {
        self.capability != ToolCapability::None
    }

    /// Build the fixed set of pipeline roles, all served by `model`
    pub fn roster(model: &str) -> Roster {
        let [researcher, teacher, designer] = ROLE_TABLE.map(|template| WorkerRole {
            name: template.name,
            model: model.to_string(),
            capability: template.capability,
            instructions: template.instructions,
        });

        Roster {
            researcher,
            teacher,
            designer,
        }
    }
}

/// The three roles in pipeline order
#[derive(Debug, Clone)]
pub struct Roster {
    pub researcher: WorkerRole,
    pub teacher: WorkerRole,
    pub designer: WorkerRole,
}

struct RoleTemplate {
    name: &'static str,
    capability: ToolCapability,
    instructions: &'static [&'static str],
}

const ROLE_TABLE: [RoleTemplate; 3] = [
    RoleTemplate {
        name: "Researcher",
        capability: ToolCapability::PaperSearch,
        instructions: RESEARCHER_INSTRUCTIONS,
    },
    RoleTemplate {
        name: "Teacher",
        capability: ToolCapability::None,
        instructions: TEACHER_INSTRUCTIONS,
    },
    RoleTemplate {
        name: "Designer",
        capability: ToolCapability::None,
        instructions: DESIGNER_INSTRUCTIONS,
    },
];

const RESEARCHER_INSTRUCTIONS: &[&str] = &[
    "You are an academic researcher covering artificial intelligence.",
    "Use the arXiv tools to find the most significant AI paper submitted in the requested time window.",
    "Read the actual paper content when it is available, not just the abstract.",
    "Return a comprehensive report of at least 400 words containing:",
    "1. Full Title",
    "2. arXiv PDF Link (a valid URL starting with http)",
    "3. Detailed Abstract",
    "4. In-depth Methodology",
    "5. Quantitative Results",
    "CRITICAL: Search first to obtain the list of paper IDs, then call read_arxiv_papers with IDs taken from that list. Never use placeholder IDs such as 'searched_id'.",
    "CRITICAL: Return ONLY the report. Start directly with the title, without any commentary about your process.",
];

const TEACHER_INSTRUCTIONS: &[&str] = &[
    "You are a witty, charismatic science communicator.",
    "Take the technical research you are given and explain it as if talking to a friend over coffee.",
    "Use one vivid, creative analogy (cooking, sports, science fiction, video games) that strips away the jargon.",
    "Be relatable and a little funny. Focus on the moment where it clicks.",
    "CRITICAL: Jump straight into the story. Never announce what you are about to do; open with something like 'Think of it like...' or 'Imagine you are...'.",
];

const DESIGNER_INSTRUCTIONS: &[&str] = &[
    "You are a top-tier social media manager.",
    "Write a notification that makes people stop scrolling and look.",
    "Do not sound like a bot. Be punchy, intriguing and human.",
    "Format: '[Hook] - [The real value]'",
    "Example: 'AI just got a memory upgrade - this new technique lets findings stick for good.'",
    "CRITICAL: Return ONLY the final notification text.",
];

use serde::{Deserialize, Serialize};

/// Structured candidate profile (a resume) as handed over by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CandidateDocument {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl CandidateDocument {
    /// Render the structured profile as the free text used for keyword and readability
    /// analysis. Identity lines are left out so they do not skew sentence statistics.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        if !self.summary.trim().is_empty() {
            lines.push(self.summary.trim().to_string());
        }
        for entry in &self.experience {
            let heading = match (entry.title.trim(), entry.organization.trim()) {
                ("", "") => None,
                (title, "") => Some(title.to_string()),
                ("", organization) => Some(organization.to_string()),
                (title, organization) => Some(format!("{title} at {organization}")),
            };
            if let Some(heading) = heading {
                lines.push(heading);
            }
            lines.extend(
                entry
                    .bullets
                    .iter()
                    .map(|bullet| bullet.trim())
                    .filter(|bullet| !bullet.is_empty())
                    .map(str::to_string),
            );
        }
        if !self.skills.is_empty() {
            lines.push(format!("Skills: {}", self.skills.join(", ")));
        }
        lines.join("\n")
    }

    pub fn bullets(&self) -> impl Iterator<Item = &str> {
        self.experience
            .iter()
            .flat_map(|entry| entry.bullets.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl ContactInfo {
    /// A candidate is reachable when at least an e-mail address or a phone number is present.
    pub fn is_reachable(&self) -> bool {
        [&self.email, &self.phone]
            .into_iter()
            .any(|value| value.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

/// Free-text posting the candidate is matched against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TargetDocument {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: String,
}

impl TargetDocument {
    pub fn text(&self) -> String {
        match self.title.trim() {
            "" => self.description.clone(),
            title => format!("{title}\n{}", self.description),
        }
    }

    pub fn label(&self) -> String {
        match (self.title.trim(), self.company.trim()) {
            ("", _) => self.id.clone(),
            (title, "") => title.to_string(),
            (title, company) => format!("{title} at {company}"),
        }
    }
}

/// Optional embedding-similarity signal computed elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingPair {
    pub candidate: Vec<f32>,
    pub target: Vec<f32>,
}

/// Everything one scoring invocation looks at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreInput {
    pub candidate_text: String,
    pub candidate: CandidateDocument,
    pub target_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<EmbeddingPair>,
}

impl ScoreInput {
    pub fn new(
        candidate_text: impl Into<String>,
        candidate: CandidateDocument,
        target_text: impl Into<String>,
    ) -> Self {
        Self {
            candidate_text: candidate_text.into(),
            candidate,
            target_text: target_text.into(),
            embeddings: None,
        }
    }

    pub fn from_documents(candidate: &CandidateDocument, target: &TargetDocument) -> Self {
        Self::new(candidate.plain_text(), candidate.clone(), target.text())
    }

    pub fn with_embeddings(mut self, embeddings: EmbeddingPair) -> Self {
        self.embeddings = Some(embeddings);
        self
    }
}

//! Gazetteer skill matching

use crate::error::{Result, ResumeScorerError};
use crate::processing::text_processor::title_case;
use aho_corasick::{AhoCorasick, MatchKind};
use std::collections::BTreeSet;

/// Known skill terms matched case-insensitively on whole-token boundaries
pub struct SkillGazetteer {
    matcher: AhoCorasick,
    terms: Vec<String>,
    display_names: Vec<String>,
}

impl SkillGazetteer {
    pub fn new() -> Result<Self> {
        Self::with_custom_skills(Vec::new())
    }

    /// Extend the built-in list; custom skills are displayed title-cased
    pub fn with_custom_skills(additional_skills: Vec<String>) -> Result<Self> {
        let mut entries: Vec<(String, String)> = DEFAULT_SKILLS
            .iter()
            .map(|(term, display)| (term.to_string(), display.to_string()))
            .collect();
        entries.extend(
            additional_skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(|s| (s.to_lowercase(), title_case(&s))),
        );
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.dedup_by(|a, b| a.0 == b.0);

        let (terms, display_names): (Vec<String>, Vec<String>) = entries.into_iter().unzip();

        // Overlapping search so a rejected hit ("go" inside "golang") never hides a valid one
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&terms)
            .map_err(|e| {
                ResumeScorerError::TextProcessing(format!("Failed to build skill matcher: {}", e))
            })?;

        Ok(Self { matcher, terms, display_names })
    }

    /// Display names of every gazetteer skill found in `text`
    pub fn find_skills(&self, text: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();

        for mat in self.matcher.find_overlapping_iter(text) {
            if is_token_boundary(text, mat.start(), mat.end()) {
                found.insert(self.display_names[mat.pattern().as_usize()].clone());
            }
        }

        found
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.binary_search(&term.to_lowercase()).is_ok()
    }

    pub fn skill_count(&self) -> usize {
        self.terms.len()
    }
}

impl Default for SkillGazetteer {
    fn default() -> Self {
        Self::new().expect("Failed to create default skill gazetteer")
    }
}

/// The match must not be glued to letters or digits on either side
fn is_token_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
}

const DEFAULT_SKILLS: &[(&str, &str)] = &[
    // Programming languages
    ("python", "Python"),
    ("java", "Java"),
    ("javascript", "JavaScript"),
    ("typescript", "TypeScript"),
    ("c++", "C++"),
    ("c#", "C#"),
    ("go", "Go"),
    ("rust", "Rust"),
    ("ruby", "Ruby"),
    ("php", "PHP"),
    ("swift", "Swift"),
    ("kotlin", "Kotlin"),
    ("scala", "Scala"),
    ("haskell", "Haskell"),
    ("matlab", "MATLAB"),
    ("bash", "Bash"),
    ("sql", "SQL"),
    // Web
    ("html", "HTML"),
    ("css", "CSS"),
    ("react", "React"),
    ("angular", "Angular"),
    ("vue", "Vue"),
    ("svelte", "Svelte"),
    ("node.js", "Node.js"),
    ("nodejs", "Node.js"),
    ("express.js", "Express"),
    ("next.js", "Next.js"),
    ("django", "Django"),
    ("flask", "Flask"),
    ("fastapi", "FastAPI"),
    ("spring", "Spring"),
    ("rails", "Rails"),
    ("graphql", "GraphQL"),
    ("rest api", "REST"),
    ("restful", "REST"),
    ("grpc", "gRPC"),
    // Infrastructure
    ("docker", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("terraform", "Terraform"),
    ("ansible", "Ansible"),
    ("aws", "AWS"),
    ("azure", "Azure"),
    ("gcp", "GCP"),
    ("linux", "Linux"),
    ("git", "Git"),
    ("jenkins", "Jenkins"),
    ("ci/cd", "CI/CD"),
    ("microservices", "Microservices"),
    ("nginx", "Nginx"),
    // Data stores
    ("mysql", "MySQL"),
    ("postgresql", "PostgreSQL"),
    ("postgres", "PostgreSQL"),
    ("mongodb", "MongoDB"),
    ("redis", "Redis"),
    ("elasticsearch", "Elasticsearch"),
    ("cassandra", "Cassandra"),
    ("dynamodb", "DynamoDB"),
    ("sqlite", "SQLite"),
    ("kafka", "Kafka"),
    // Data and ML
    ("machine learning", "Machine Learning"),
    ("deep learning", "Deep Learning"),
    ("data analysis", "Data Analysis"),
    ("tensorflow", "TensorFlow"),
    ("pytorch", "PyTorch"),
    ("pandas", "Pandas"),
    ("numpy", "NumPy"),
    ("scikit-learn", "scikit-learn"),
    ("spark", "Spark"),
    ("hadoop", "Hadoop"),
    ("airflow", "Airflow"),
    ("tableau", "Tableau"),
    ("excel", "Excel"),
    // Testing and process
    ("pytest", "pytest"),
    ("jest", "Jest"),
    ("selenium", "Selenium"),
    ("agile", "Agile"),
    ("scrum", "Scrum"),
    ("jira", "Jira"),
    // Professional skills
    ("communication", "Communication"),
    ("leadership", "Leadership"),
    ("problem solving", "Problem Solving"),
    ("negotiation", "Negotiation"),
    ("documentation", "Documentation"),
    ("legal drafting", "Legal Drafting"),
    ("financial analysis", "Financial Analysis"),
    ("public speaking", "Public Speaking"),
    ("marketing", "Marketing"),
    ("sales", "Sales"),
    ("project management", "Project Management"),
    ("teamwork", "Teamwork"),
    ("research", "Research"),
    ("presentation", "Presentation"),
    ("strategic planning", "Strategic Planning"),
    ("decision making", "Decision Making"),
];

//! Study resource catalog
//!
//! A fixed list of school subjects the assistant can help with, tips for
//! asking good questions, and external learning sites.

use clap::ValueEnum;
use colored::Colorize;

/// Catalog section
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceTab {
    /// School subjects and their topics
    Subjects,
    /// Tips for using the assistant
    Guide,
    /// External learning sites
    External,
}

/// A subject area and the topics it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectCategory {
    pub title: &'static str,
    pub description: &'static str,
    pub topics: [&'static str; 4],
}

/// A usage tip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tip {
    pub title: &'static str,
    pub description: &'static str,
}

/// An external learning site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalResource {
    pub title: &'static str,
    pub description: &'static str,
    pub url: &'static str,
}

pub const SUBJECTS: [SubjectCategory; 6] = [
    SubjectCategory {
        title: "Mathematics",
        description: "Mathematical concepts and methods from middle to high school",
        topics: [
            "Algebra and equations",
            "Geometry and trigonometry",
            "Calculus and functions",
            "Probability and statistics",
        ],
    },
    SubjectCategory {
        title: "Physical Sciences",
        description: "Principles and experiments in physics and chemistry",
        topics: [
            "Mechanics and forces",
            "Electricity and magnetism",
            "Optics and waves",
            "Organic and inorganic chemistry",
        ],
    },
    SubjectCategory {
        title: "French",
        description: "Language, literature and written expression",
        topics: [
            "Grammar and conjugation",
            "Literature and literary movements",
            "Commentary and essay writing",
            "Argumentation and persuasion",
        ],
    },
    SubjectCategory {
        title: "Languages",
        description: "English, Spanish, German and other languages",
        topics: [
            "Vocabulary and expressions",
            "Grammar and tenses",
            "Listening and reading comprehension",
            "Culture and civilisation",
        ],
    },
    SubjectCategory {
        title: "History-Geography",
        description: "Historical periods and geographical concepts",
        topics: [
            "Ancient and medieval history",
            "Modern and contemporary history",
            "Human and economic geography",
            "Geopolitics and globalisation",
        ],
    },
    SubjectCategory {
        title: "Life and Earth Sciences",
        description: "Biology, geology and the environment",
        topics: [
            "Genetics and evolution",
            "The human body and health",
            "Ecology and biodiversity",
            "Geology and climatology",
        ],
    },
];

pub const TIPS: [Tip; 5] = [
    Tip {
        title: "Ask precise questions",
        description: "Phrase your questions clearly and specifically to get more relevant answers.",
    },
    Tip {
        title: "State your level",
        description: "Say whether you are in middle or high school so explanations fit your level.",
    },
    Tip {
        title: "Ask for exercises",
        description: "Request practice exercises on a specific topic to train.",
    },
    Tip {
        title: "Get corrections",
        description: "Share your answers to receive corrections and constructive feedback.",
    },
    Tip {
        title: "Revise efficiently",
        description: "Use the assistant before a test or exam to get personalised summaries.",
    },
];

pub const EXTERNAL: [ExternalResource; 4] = [
    ExternalResource {
        title: "Khan Academy",
        description: "Free courses and exercises in many subjects",
        url: "https://fr.khanacademy.org/",
    },
    ExternalResource {
        title: "Eduscol",
        description: "Official teaching resources from the French Ministry of Education",
        url: "https://eduscol.education.fr/",
    },
    ExternalResource {
        title: "Lumni",
        description: "Educational audiovisual content for every level",
        url: "https://www.lumni.fr/",
    },
    ExternalResource {
        title: "Bibliotheque nationale de France",
        description: "Cultural and literary resources online",
        url: "https://www.bnf.fr/fr",
    },
];

/// Print one catalog section, or all of them
pub fn show_resources(tab: Option<ResourceTab>) {
    println!("{}", "Resource Center".bold());
    println!(
        "{}\n",
        "TurboPech can help with many school subjects. Browse the sections below to see how."
            .dimmed()
    );

    match tab {
        Some(tab) => print!("{}", render_tab(tab)),
        None => {
            for tab in ResourceTab::value_variants() {
                print!("{}", render_tab(*tab));
                println!();
            }
        }
    }
}

/// Render a catalog section as plain text
pub fn render_tab(tab: ResourceTab) -> String {
    let mut out = String::new();
    match tab {
        ResourceTab::Subjects => {
            out.push_str("SUBJECTS\n");
            for category in &SUBJECTS {
                out.push_str(&format!("\n  {}\n", category.title));
                out.push_str(&format!("  {}\n", category.description));
                for topic in &category.topics {
                    out.push_str(&format!("    - {}\n", topic));
                }
            }
        }
        ResourceTab::Guide => {
            out.push_str("HOW TO USE THE ASSISTANT\n");
            for (index, tip) in TIPS.iter().enumerate() {
                out.push_str(&format!("\n  Tip {}: {}\n", index + 1, tip.title));
                out.push_str(&format!("  {}\n", tip.description));
            }
        }
        ResourceTab::External => {
            out.push_str("EXTERNAL RESOURCES\n");
            for resource in &EXTERNAL {
                out.push_str(&format!("\n  {}\n", resource.title));
                out.push_str(&format!("  {}\n", resource.description));
                out.push_str(&format!("  {}\n", resource.url));
            }
        }
    }
    out
}

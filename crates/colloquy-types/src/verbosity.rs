use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How detailed "explain with AI" answers should be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VerbosityLevel {
    #[default]
    High,
    Medium,
    Low,
}

const PREAMBLE: &str = "You're a seasoned DevOps engineer with experience in Kubernetes, GitOps and Infrastructure As Code, \
and need to give a concise but clear explanation of an infrastructure problem that will likely involve either Kubernetes or Terraform. \
The user is not necessarily an expert in the domain, so please ";

impl VerbosityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerbosityLevel::High => "High",
            VerbosityLevel::Medium => "Medium",
            VerbosityLevel::Low => "Low",
        }
    }

    /// System prompt sent with explain requests at this level
    pub fn system_prompt(&self) -> String {
        let body = match self {
            VerbosityLevel::Low => {
                "provide documentation and evidence to explain what issue they're facing. \
Give a short overview of the resource they are mentioning and any guidance on how they can learn more about how it works. \
Keep your response to 1-2 sections."
            }
            VerbosityLevel::Medium => {
                "provide documentation and evidence to explain what issue they're facing. \
Give a short overview of the resource they are mentioning and any guidance on how they can learn more about how it works. \
Keep your response to 3-5 sections."
            }
            VerbosityLevel::High => {
                "provide as much documentation and evidence as is necessary to explain what issue they're facing. \
Give a descriptive overview of the resource they are mentioning and any guidance on how they can learn more about how it works."
            }
        };
        format!("{PREAMBLE}{body}")
    }
}

impl FromStr for VerbosityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(VerbosityLevel::High),
            "Medium" => Ok(VerbosityLevel::Medium),
            "Low" => Ok(VerbosityLevel::Low),
            other => Err(format!("unknown verbosity level: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_str() {
        for level in [VerbosityLevel::High, VerbosityLevel::Medium, VerbosityLevel::Low] {
            assert_eq!(level.as_str().parse::<VerbosityLevel>(), Ok(level));
        }
        assert!("Loud".parse::<VerbosityLevel>().is_err());
    }

    #[test]
    fn test_system_prompt_section_limits() {
        assert!(VerbosityLevel::Low.system_prompt().contains("1-2 sections"));
        assert!(VerbosityLevel::Medium.system_prompt().contains("3-5 sections"));
        assert!(!VerbosityLevel::High.system_prompt().contains("sections"));
    }
}

/// Person-name input as it arrives in account payloads.
///
/// Clients send either a single `name` field or separate `firstName` and
/// `lastName` fields. Split fields win when both forms are present. A single
/// name is divided at its first whitespace boundary and any missing half is
/// filled with the caller-chosen placeholder, so normalization never fails.
#[derive(Debug, Clone, PartialEq)]
pub enum NameInput {
    Full(String),
    Parts {
        first: Option<String>,
        last: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedName {
    pub first_name: String,
    pub last_name: String,
}

impl NameInput {
    pub fn from_fields(
        name: Option<String>,
        first: Option<String>,
        last: Option<String>,
    ) -> NameInput {
        let first = first.filter(|s| !s.trim().is_empty());
        let last = last.filter(|s| !s.trim().is_empty());
        if first.is_some() || last.is_some() {
            return NameInput::Parts { first, last };
        }
        match name.filter(|s| !s.trim().is_empty()) {
            Some(full) => NameInput::Full(full),
            None => NameInput::Parts {
                first: None,
                last: None,
            },
        }
    }

    pub fn normalize(self, placeholder: &str) -> NormalizedName {
        match self {
            NameInput::Full(full) => {
                let full = full.trim();
                match full.split_once(char::is_whitespace) {
                    Some((first, rest)) => NormalizedName {
                        first_name: first.to_string(),
                        last_name: rest.trim().to_string(),
                    },
                    None => NormalizedName {
                        first_name: full.to_string(),
                        last_name: placeholder.to_string(),
                    },
                }
            }
            NameInput::Parts { first, last } => NormalizedName {
                first_name: first
                    .map(|s| s.trim().to_string())
                    .unwrap_or_else(|| placeholder.to_string()),
                last_name: last
                    .map(|s| s.trim().to_string())
                    .unwrap_or_else(|| placeholder.to_string()),
            },
        }
    }
}

impl NormalizedName {
    pub fn display(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

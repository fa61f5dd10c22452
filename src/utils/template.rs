// file: src/utils/template.rs
// description: placeholder substitution for prompt summaries
// reference: Internal code standards

/// Text with `{name}` placeholders. Unknown placeholders are left as-is so
/// literal braces in prompts survive rendering.
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Single pass over the template, so substituted values are never
    /// scanned for placeholders themselves.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            result.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            let substitution = after.find('}').and_then(|end| {
                let name = &after[..end];
                values
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (*value, end))
            });

            match substitution {
                Some((value, end)) => {
                    result.push_str(value);
                    rest = &after[end + 1..];
                }
                None => {
                    result.push('{');
                    rest = after;
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Names of the `{placeholder}` tokens, in order of first appearance.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    if !name.is_empty()
                        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                        && !names.iter().any(|n| n == name)
                    {
                        names.push(name.to_string());
                    }
                    rest = &after[end + 1..];
                }
                None => break,
            }
        }

        names
    }
}

/// Collects positional parameters for a Postgres statement and hands out
/// `$n` placeholders in bind order.
#[derive(Debug, Default, Clone)]
pub struct ParamList {
    params: Vec<String>,
}

impl ParamList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value and return its placeholder.
    pub fn param(&mut self, value: impl Into<String>) -> String {
        self.params.push(value.into());
        format!("${}", self.params.len())
    }

    /// Expand a list of values into `($1, $2, ...)` for an IN clause.
    /// An empty list yields `None`; the caller decides what that means.
    pub fn in_list<I, S>(&mut self, values: I) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let placeholders: Vec<String> = values.into_iter().map(|v| self.param(v)).collect();
        if placeholders.is_empty() {
            None
        } else {
            Some(format!("({})", placeholders.join(", ")))
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_params(self) -> Vec<String> {
        self.params
    }
}

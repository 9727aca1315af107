// packbuild-common/src/variables.rs
// Variable lookup capability consumed by the (external) document
// templating step during packaging-metadata generation.

/// Anything that can answer variable queries by name.
pub trait VariableProvider {
    fn provides(&self, name: &str) -> Option<String>;
}

/// Queries a stack of providers in order; the first answer wins. Entity
/// specific providers (platforms, dependencies) are pushed in front of the
/// project-wide provider.
pub struct LayeredVariables<'a> {
    layers: Vec<&'a dyn VariableProvider>,
}

impl<'a> LayeredVariables<'a> {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn push(&mut self, provider: &'a dyn VariableProvider) -> &mut Self {
        self.layers.push(provider);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.provides(name))
    }
}

impl Default for LayeredVariables<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, &'static str);

    impl VariableProvider for Fixed {
        fn provides(&self, name: &str) -> Option<String> {
            (name == self.0).then(|| self.1.to_string())
        }
    }

    #[test]
    fn earlier_layers_shadow_later_ones() {
        let platform = Fixed("id", "platform-id");
        let project = Fixed("id", "project-id");
        let mut vars = LayeredVariables::new();
        vars.push(&platform).push(&project);
        assert_eq!(vars.lookup("id").as_deref(), Some("platform-id"));
    }

    #[test]
    fn unknown_names_fall_through_to_none() {
        let project = Fixed("project/name", "example");
        let mut vars = LayeredVariables::new();
        vars.push(&project);
        assert_eq!(vars.lookup("project/name").as_deref(), Some("example"));
        assert_eq!(vars.lookup("missing"), None);
    }
}

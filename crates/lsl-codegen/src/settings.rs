// SPDX-License-Identifier: (MIT OR Apache-2.0)

/// Output options for [`CSharpGenerator`](crate::CSharpGenerator).
///
/// The default produces a bare class body, the form the host runtime
/// accepts for client-uploaded scripts. [`CompilerSettings::opensim_server`]
/// produces a complete compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSettings {
    /// Wrap the output in a class declaration.
    pub generate_class: bool,
    pub class_name: String,
    pub namespace: Option<String>,
    /// Base class or interface list, without the leading colon.
    pub base_type: Option<String>,
    /// Everything after the class name in the constructor declaration.
    pub constructor_signature: String,
    pub constructor_body: Option<String>,
    /// Namespaces written as `using` directives.
    pub imports: Vec<String>,
    pub insert_coop_termination: bool,
    pub coop_termination_call: String,
    /// Written verbatim before everything else.
    pub script_header: Option<String>,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            generate_class: false,
            class_name: "LSLScript".to_string(),
            namespace: None,
            base_type: None,
            constructor_signature: "()".to_string(),
            constructor_body: None,
            imports: Vec::new(),
            insert_coop_termination: false,
            coop_termination_call: "opensim_reserved_CheckForCoopTermination()".to_string(),
            script_header: None,
        }
    }
}

impl CompilerSettings {
    /// A full class for the server-side script engine.
    pub fn opensim_server() -> Self {
        Self {
            generate_class: true,
            class_name: "XEngineScript".to_string(),
            namespace: Some("SecondLife".to_string()),
            base_type: Some("OpenSim.Region.ScriptEngine.XEngine.ScriptBase.XEngineScriptBase".to_string()),
            constructor_signature:
                "(System.Threading.WaitHandle coopSleepHandle) : base(coopSleepHandle)".to_string(),
            imports: vec![
                "OpenSim.Region.ScriptEngine.Shared".to_string(),
                "System.Collections.Generic".to_string(),
            ],
            ..Self::default()
        }
    }

    pub fn with_class(mut self, name: &str) -> Self {
        self.generate_class = true;
        self.class_name = name.to_string();
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    pub fn with_coop_termination(mut self) -> Self {
        self.insert_coop_termination = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_preset_wraps_in_class() {
        let s = CompilerSettings::opensim_server();
        assert!(s.generate_class);
        assert_eq!(s.namespace.as_deref(), Some("SecondLife"));
        assert!(!s.insert_coop_termination);
        assert_eq!(s.coop_termination_call, CompilerSettings::default().coop_termination_call);
    }

    #[test]
    fn builders_enable_options() {
        let s = CompilerSettings::default()
            .with_class("Door")
            .with_namespace("Scripts")
            .with_coop_termination();
        assert!(s.generate_class);
        assert_eq!(s.class_name, "Door");
        assert_eq!(s.namespace.as_deref(), Some("Scripts"));
        assert!(s.insert_coop_termination);
    }
}

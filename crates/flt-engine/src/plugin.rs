//! Plugin attachment.
//!
//! A [`Plugin`] contributes named methods that operate on a [`Document`].
//! Plugins live in a [`PluginHost`] kept alongside the document; each call
//! passes the document in explicitly.

use std::collections::HashMap;

use log::debug;

use crate::document::Document;
use crate::error::{FltError, Result};

/// Capability object contributing methods to a document.
pub trait Plugin {
    /// Names of the methods this plugin provides.
    fn register(&self) -> Vec<&'static str>;

    /// Runs once when the plugin is attached.
    fn setup(&mut self, _doc: &mut Document, _args: &[&str]) -> Result<()> {
        Ok(())
    }

    /// Invoke one of the registered methods.
    fn call(&mut self, method: &str, doc: &mut Document, args: &[&str])
    -> Result<Option<String>>;
}

/// Plugins attached to a document, indexed by method name.
#[derive(Default)]
pub struct PluginHost {
    plugins: Vec<Box<dyn Plugin>>,
    methods: HashMap<&'static str, usize>,
}

impl PluginHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `plugin`, run its setup hook with `args` and register its methods.
    ///
    /// Fails without attaching anything if a method name is already taken.
    pub fn attach<P: Plugin + 'static>(
        &mut self,
        doc: &mut Document,
        mut plugin: P,
        args: &[&str],
    ) -> Result<()> {
        let methods = plugin.register();
        if let Some(taken) = methods.iter().find(|m| self.methods.contains_key(**m)) {
            return Err(FltError::Plugin(format!(
                "Method {taken:?} is already registered"
            )));
        }

        plugin.setup(doc, args)?;

        let index = self.plugins.len();
        self.plugins.push(Box::new(plugin));
        for method in &methods {
            self.methods.insert(*method, index);
        }
        debug!("attached plugin with methods {methods:?}");
        Ok(())
    }

    pub fn has(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Call a registered method with `doc` as its receiver.
    pub fn call(
        &mut self,
        doc: &mut Document,
        method: &str,
        args: &[&str],
    ) -> Result<Option<String>> {
        let index = *self
            .methods
            .get(method)
            .ok_or_else(|| FltError::Plugin(format!("Unknown method {method:?}")))?;
        self.plugins[index].call(method, doc, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tagger {
        setups: usize,
        prefix: String,
    }

    impl Plugin for Tagger {
        fn register(&self) -> Vec<&'static str> {
            vec!["tag", "setups"]
        }

        fn setup(&mut self, _doc: &mut Document, args: &[&str]) -> Result<()> {
            self.setups += 1;
            self.prefix = args.first().copied().unwrap_or("#").to_string();
            Ok(())
        }

        fn call(
            &mut self,
            method: &str,
            doc: &mut Document,
            args: &[&str],
        ) -> Result<Option<String>> {
            match method {
                "tag" => {
                    for tag in args {
                        doc.add_dc("subject", format!("{}{tag}", self.prefix))?;
                    }
                    Ok(None)
                }
                "setups" => Ok(Some(self.setups.to_string())),
                other => Err(FltError::Plugin(format!("Unexpected method {other}"))),
            }
        }
    }

    struct Clash;

    impl Plugin for Clash {
        fn register(&self) -> Vec<&'static str> {
            vec!["other", "tag"]
        }

        fn call(&mut self, _: &str, _: &mut Document, _: &[&str]) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn test_setup_runs_once() {
        let mut doc = Document::new();
        let mut host = PluginHost::new();
        host.attach(&mut doc, Tagger::default(), &["+"]).unwrap();

        assert_eq!(host.methods(), vec!["setups", "tag"]);
        assert_eq!(
            host.call(&mut doc, "setups", &[]).unwrap(),
            Some("1".to_string())
        );
    }

    #[test]
    fn test_call_receives_document() {
        let mut doc = Document::new();
        let mut host = PluginHost::new();
        host.attach(&mut doc, Tagger::default(), &["+"]).unwrap();

        host.call(&mut doc, "tag", &["a", "b"]).unwrap();
        assert_eq!(doc.get_dc("subject").unwrap(), vec!["+a", "+b"]);
    }

    #[test]
    fn test_duplicate_method_is_rejected() {
        let mut doc = Document::new();
        let mut host = PluginHost::new();
        host.attach(&mut doc, Tagger::default(), &[]).unwrap();

        let err = host.attach(&mut doc, Clash, &[]).unwrap_err();
        assert!(matches!(err, FltError::Plugin(_)));
        assert!(!host.has("other"));
    }

    #[test]
    fn test_unknown_method() {
        let mut doc = Document::new();
        let mut host = PluginHost::new();
        let err = host.call(&mut doc, "missing", &[]).unwrap_err();
        assert_eq!(err.to_string(), "Plugin error: Unknown method \"missing\"");
    }
}

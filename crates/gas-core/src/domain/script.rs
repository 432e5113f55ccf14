//! Synthesis of the module script handed to the external runtime.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::domain::{ConfigExpression, GraphLayout, ResourceId};

const ACCUMULATOR: &str = "resourceNameToConfig";

/// A self-contained ES module that evaluates every confirmed config
/// expression and prints one JSON object mapping resource id to config.
///
/// An empty script means there is nothing to evaluate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigScript {
    source: String,
}

impl ConfigScript {
    /// Emit the expressions of `layout` dependencies-first.
    ///
    /// Resources without an entry in `expressions` are skipped. The output
    /// for a given input is byte-for-byte stable.
    pub fn synthesize(
        setter_module: &str,
        layout: &GraphLayout,
        expressions: &BTreeMap<ResourceId, ConfigExpression>,
    ) -> Self {
        let ordered: Vec<(&ResourceId, &ConfigExpression)> = layout
            .dependencies_first()
            .filter_map(|id| expressions.get(id).map(|expression| (id, expression)))
            .collect();

        if ordered.is_empty() {
            return Self::default();
        }

        let setters: BTreeSet<&str> = ordered
            .iter()
            .map(|(_, expression)| expression.function_name.as_str())
            .collect();

        let mut lines = Vec::with_capacity(setters.len() + ordered.len() * 2 + 5);
        lines.push("import {".to_string());
        lines.extend(setters.iter().map(|setter| format!("  {setter},")));
        lines.push(format!("}} from \"{setter_module}\";"));

        for (_, expression) in &ordered {
            lines.push(expression.evaluable());
        }

        lines.push(format!("const {ACCUMULATOR} = {{}};"));
        let mut assigned = ordered.clone();
        assigned.sort_by(|a, b| a.0.cmp(b.0));
        for (id, expression) in assigned {
            lines.push(format!(
                "{ACCUMULATOR}[\"{id}\"] = {};",
                expression.variable_name
            ));
        }
        lines.push(format!("console.log(JSON.stringify({ACCUMULATOR}));"));

        let mut source = lines.join("\n");
        source.push('\n');
        Self { source }
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn into_string(self) -> String {
        self.source
    }
}

impl fmt::Display for ConfigScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULE: &str = "@gasoline-dev/resources";

    fn id(s: &str) -> ResourceId {
        ResourceId::from_dir_name(s).unwrap()
    }

    fn expression(var: &str, setter: &str, name: &str) -> ConfigExpression {
        ConfigExpression::new(
            var,
            setter,
            format!(r#"export const {var} = {setter}({{ name: "{name}" }} as const);"#),
        )
    }

    #[test]
    fn empty_when_nothing_confirmed() {
        let layout = GraphLayout::new(vec![vec![id("kv")]], vec![], vec![]);

        let script = ConfigScript::synthesize(MODULE, &layout, &BTreeMap::new());

        assert!(script.is_empty());
        assert_eq!(script.as_str(), "");
    }

    #[test]
    fn full_script_shape() {
        let layout = GraphLayout::new(vec![vec![id("core-kv")], vec![id("core-api")]], vec![], vec![]);
        let expressions = BTreeMap::from([
            (id("core-api"), expression("coreApi", "cloudflareWorker", "CORE_API")),
            (id("core-kv"), expression("coreKv", "cloudflareKv", "CORE_KV")),
        ]);

        let script = ConfigScript::synthesize(MODULE, &layout, &expressions);

        let expected = "\
import {
  cloudflareKv,
  cloudflareWorker,
} from \"@gasoline-dev/resources\";
export const coreKv = cloudflareKv({ name: \"CORE_KV\" });
export const coreApi = cloudflareWorker({ name: \"CORE_API\" });
const resourceNameToConfig = {};
resourceNameToConfig[\"CORE_API\"] = coreApi;
resourceNameToConfig[\"CORE_KV\"] = coreKv;
console.log(JSON.stringify(resourceNameToConfig));
";
        assert_eq!(script.as_str(), expected);
    }

    #[test]
    fn dependency_precedes_dependent() {
        // A depends on B: B sits in a lower layer and must be emitted first.
        let layout = GraphLayout::new(vec![vec![id("b")], vec![id("a")]], vec![], vec![]);
        let expressions = BTreeMap::from([
            (id("a"), expression("a", "cloudflareWorker", "A")),
            (id("b"), expression("b", "cloudflareWorker", "B")),
        ]);

        let script = ConfigScript::synthesize(MODULE, &layout, &expressions).into_string();

        let a = script.find("export const a =").unwrap();
        let b = script.find("export const b =").unwrap();
        assert!(b < a);
    }

    #[test]
    fn setter_imported_once_when_shared() {
        let layout = GraphLayout::new(vec![vec![id("x"), id("y")]], vec![], vec![]);
        let expressions = BTreeMap::from([
            (id("x"), expression("x", "cloudflareKv", "X")),
            (id("y"), expression("y", "cloudflareKv", "Y")),
        ]);

        let script = ConfigScript::synthesize(MODULE, &layout, &expressions);

        assert_eq!(script.as_str().matches("  cloudflareKv,").count(), 1);
    }

    #[test]
    fn resources_without_expression_are_skipped() {
        let layout = GraphLayout::new(vec![vec![id("bare"), id("kv")]], vec![], vec![]);
        let expressions = BTreeMap::from([(id("kv"), expression("kv", "cloudflareKv", "KV"))]);

        let script = ConfigScript::synthesize(MODULE, &layout, &expressions);

        assert!(!script.as_str().contains("BARE"));
        assert!(script.as_str().contains("resourceNameToConfig[\"KV\"] = kv;"));
    }
}

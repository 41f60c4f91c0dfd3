//! Derivation order over declared field dependencies.

use std::collections::{BTreeMap, BTreeSet};

use stroke_model::{FieldRule, SchemaError};

/// Returns field indices in an order where every field comes after the fields
/// it depends on. Ties keep declaration order so independent fields are
/// evaluated exactly as declared.
pub fn derivation_order(fields: &[FieldRule]) -> Result<Vec<usize>, SchemaError> {
    let index: BTreeMap<&str, usize> = fields
        .iter()
        .enumerate()
        .map(|(idx, field)| (field.name.as_str(), idx))
        .collect();

    let mut pending: Vec<BTreeSet<usize>> = Vec::with_capacity(fields.len());
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); fields.len()];
    for (idx, field) in fields.iter().enumerate() {
        let mut deps = BTreeSet::new();
        for dependency in field.rule.dependencies() {
            let Some(&dep_idx) = index.get(dependency) else {
                return Err(SchemaError::UnknownDependency {
                    field: field.name.clone(),
                    dependency: dependency.to_string(),
                });
            };
            if deps.insert(dep_idx) {
                dependents[dep_idx].push(idx);
            }
        }
        pending.push(deps);
    }

    let mut ready: BTreeSet<usize> = pending
        .iter()
        .enumerate()
        .filter(|(_, deps)| deps.is_empty())
        .map(|(idx, _)| idx)
        .collect();
    let mut order = Vec::with_capacity(fields.len());
    while let Some(idx) = ready.pop_first() {
        order.push(idx);
        for &dependent in &dependents[idx] {
            pending[dependent].remove(&idx);
            if pending[dependent].is_empty() {
                ready.insert(dependent);
            }
        }
    }

    if order.len() == fields.len() {
        return Ok(order);
    }
    Err(SchemaError::CyclicDependency {
        fields: find_cycle(fields, &pending),
    })
}

/// Walks unresolved dependencies until a field repeats. Every unresolved
/// field still waits on another unresolved field, so the walk always closes.
fn find_cycle(fields: &[FieldRule], pending: &[BTreeSet<usize>]) -> Vec<String> {
    let Some(start) = pending.iter().position(|deps| !deps.is_empty()) else {
        return Vec::new();
    };
    let mut path = vec![start];
    let mut current = start;
    loop {
        let Some(&next) = pending[current].iter().next() else {
            break;
        };
        if let Some(pos) = path.iter().position(|&idx| idx == next) {
            let mut cycle: Vec<String> = path[pos..]
                .iter()
                .map(|&idx| fields[idx].name.clone())
                .collect();
            cycle.push(fields[next].name.clone());
            return cycle;
        }
        path.push(next);
        current = next;
    }
    path.iter().map(|&idx| fields[idx].name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use stroke_model::Rule;

    use super::*;

    fn flag(name: &str) -> FieldRule {
        FieldRule {
            name: name.to_string(),
            description: None,
            rule: Rule::Presence {
                source: format!("raw_{name}"),
            },
        }
    }

    fn sum(name: &str, deps: &[&str]) -> FieldRule {
        FieldRule {
            name: name.to_string(),
            description: None,
            rule: Rule::Sum {
                depends_on: deps.iter().map(|d| (*d).to_string()).collect(),
                min: 0,
                max: 10,
            },
        }
    }

    #[test]
    fn dependencies_come_first() {
        let fields = vec![sum("total", &["a", "b"]), flag("a"), flag("b")];
        let order = derivation_order(&fields).unwrap();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn independent_fields_keep_declaration_order() {
        let fields = vec![flag("c"), flag("a"), flag("b")];
        assert_eq!(derivation_order(&fields).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let fields = vec![sum("total", &["missing"])];
        assert_eq!(
            derivation_order(&fields),
            Err(SchemaError::UnknownDependency {
                field: "total".to_string(),
                dependency: "missing".to_string(),
            })
        );
    }

    #[test]
    fn cycle_is_reported_with_its_fields() {
        let fields = vec![flag("a"), sum("x", &["y", "a"]), sum("y", &["x"])];
        match derivation_order(&fields) {
            Err(SchemaError::CyclicDependency { fields }) => {
                assert_eq!(fields.first(), fields.last());
                assert!(fields.contains(&"x".to_string()));
                assert!(fields.contains(&"y".to_string()));
                assert!(!fields.contains(&"a".to_string()));
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let fields = vec![sum("x", &["x"])];
        assert!(matches!(
            derivation_order(&fields),
            Err(SchemaError::CyclicDependency { .. })
        ));
    }
}

use serde::Serialize;

/// One graph element as consumed by the rendering layer.
///
/// Nodes and edges travel in a single ordered sequence so that element order
/// survives into the renderer. Edges optionally carry a `classes` string used
/// for styling (e.g. `"class-connect"` on group-derived connections).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Element<N, E> {
    Node {
        data: N,
    },
    Edge {
        data: E,
        #[serde(skip_serializing_if = "Option::is_none")]
        classes: Option<String>,
    },
}

impl<N, E> Element<N, E> {
    pub fn node(data: N) -> Self {
        Element::Node { data }
    }

    pub fn edge(data: E) -> Self {
        Element::Edge {
            data,
            classes: None,
        }
    }

    pub fn classed_edge(data: E, classes: impl Into<String>) -> Self {
        Element::Edge {
            data,
            classes: Some(classes.into()),
        }
    }

    pub fn as_node(&self) -> Option<&N> {
        match self {
            Element::Node { data } => Some(data),
            Element::Edge { .. } => None,
        }
    }

    pub fn as_edge(&self) -> Option<&E> {
        match self {
            Element::Edge { data, .. } => Some(data),
            Element::Node { .. } => None,
        }
    }
}

/// Drop every element structurally equal to one already kept, preserving
/// first-seen order.
pub fn dedup_preserving_order<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence() {
        let items = vec!["a", "b", "a", "c", "b"];
        assert_eq!(dedup_preserving_order(items), vec!["a", "b", "c"]);
    }

    #[test]
    fn edge_serializes_classes_only_when_present() {
        #[derive(Serialize, PartialEq, Debug, Clone)]
        struct E {
            source: String,
            target: String,
        }

        let plain: Element<(), E> = Element::edge(E {
            source: "a".into(),
            target: "b".into(),
        });
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("classes").is_none());

        let classed: Element<(), E> = Element::classed_edge(
            E {
                source: "a".into(),
                target: "b".into(),
            },
            "class-connect",
        );
        let json = serde_json::to_value(&classed).unwrap();
        assert_eq!(json["classes"], "class-connect");
    }
}

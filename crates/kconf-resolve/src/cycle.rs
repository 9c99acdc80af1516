//! Structural cycle detection over the symbol reference graph.
//!
//! An option depends on every symbol read by its dependency expression and
//! by its default rules. A choice member additionally depends on everything
//! that decides its group's preferred member: the group's dependency, the
//! group's default conditions and the dependency of every member.
//!
//! A strongly connected component with more than one option, or an option
//! that reads itself, can never be resolved by relaxation in a meaningful
//! way and is reported before propagation starts.

use kconf_schema::{Expr, OptionGraph, OptionId};

/// Adjacency lists: option -> options it reads, deduplicated.
fn reference_edges(graph: &OptionGraph) -> Vec<Vec<usize>> {
    let mut edges = vec![Vec::new(); graph.len()];
    for (id, option) in graph.options() {
        let mut exprs: Vec<&Expr> = vec![&option.depends];
        for rule in &option.defaults {
            exprs.push(&rule.value);
            exprs.push(&rule.condition);
        }
        if let Some(gid) = graph.group_of(id) {
            let group = graph.group(gid);
            exprs.push(&group.depends);
            exprs.extend(group.defaults.iter().map(|d| &d.condition));
            exprs.extend(graph.members(gid).iter().map(|&m| &graph.option(m).depends));
        }

        let out = &mut edges[id.index()];
        for expr in exprs {
            for symbol in expr.symbols() {
                if let Some(target) = graph.lookup(symbol) {
                    if !out.contains(&target.index()) {
                        out.push(target.index());
                    }
                }
            }
        }
    }
    edges
}

/// Every option that takes part in a reference cycle, in declaration order.
pub fn cyclic_options(graph: &OptionGraph) -> Vec<OptionId> {
    let mut cyclic: Vec<OptionId> = strongly_connected(graph)
        .into_iter()
        .flatten()
        .collect();
    cyclic.sort();
    cyclic
}

/// Cyclic strongly connected components, each sorted, ordered by their
/// first member. Iterative Tarjan, so deep chains do not exhaust the stack.
pub fn strongly_connected(graph: &OptionGraph) -> Vec<Vec<OptionId>> {
    const UNVISITED: usize = usize::MAX;

    let edges = reference_edges(graph);
    let n = edges.len();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0;
    let mut components: Vec<Vec<usize>> = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        // (node, next edge to explore)
        let mut work: Vec<(usize, usize)> = vec![(root, 0)];
        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(frame) = work.last_mut() {
            let v = frame.0;
            if frame.1 < edges[v].len() {
                let w = edges[v][frame.1];
                frame.1 += 1;
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    work.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            work.pop();
            if let Some(&(parent, _)) = work.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
            if lowlink[v] != index[v] {
                continue;
            }
            let mut component = Vec::new();
            while let Some(w) = stack.pop() {
                on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            if component.len() > 1 || edges[v].contains(&v) {
                component.sort_unstable();
                components.push(component);
            }
        }
    }

    components.sort_by_key(|c| c[0]);
    components
        .into_iter()
        .map(|c| {
            c.into_iter()
                .filter_map(|i| graph.id_at(i))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kconf_schema::{ChoiceMode, OptionGraphBuilder};

    fn names(graph: &OptionGraph, ids: &[OptionId]) -> Vec<String> {
        ids.iter().map(|&id| graph.option(id).name.clone()).collect()
    }

    #[test]
    fn acyclic_chain_has_no_cycles() {
        let mut b = OptionGraphBuilder::new();
        b.bool("A").default(Expr::y());
        b.bool("B").depends(Expr::sym("A")).default_if(Expr::y(), Expr::sym("A"));
        b.bool("C").depends(Expr::sym("B").and(Expr::sym("A")));
        let graph = b.build().unwrap();
        assert!(cyclic_options(&graph).is_empty());
    }

    #[test]
    fn mutual_default_conditions_form_a_cycle() {
        let mut b = OptionGraphBuilder::new();
        b.bool("C").default_if(Expr::y(), Expr::sym("D"));
        b.bool("D").default_if(Expr::y(), Expr::sym("C"));
        b.bool("E").depends(Expr::sym("C"));
        let graph = b.build().unwrap();
        assert_eq!(names(&graph, &cyclic_options(&graph)), vec!["C", "D"]);
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut b = OptionGraphBuilder::new();
        b.bool("A");
        b.bool("SELF").depends(Expr::sym("A")).default(Expr::sym("SELF"));
        let graph = b.build().unwrap();
        assert_eq!(names(&graph, &cyclic_options(&graph)), vec!["SELF"]);
    }

    #[test]
    fn separate_cycles_reported_in_declaration_order() {
        let mut b = OptionGraphBuilder::new();
        b.bool("P").depends(Expr::sym("Q"));
        b.bool("X").depends(Expr::sym("Y"));
        b.bool("Q").depends(Expr::sym("P"));
        b.bool("Y").depends(Expr::sym("X"));
        let graph = b.build().unwrap();
        let sccs = strongly_connected(&graph);
        assert_eq!(sccs.len(), 2);
        assert_eq!(names(&graph, &sccs[0]), vec!["P", "Q"]);
        assert_eq!(names(&graph, &cyclic_options(&graph)), vec!["P", "X", "Q", "Y"]);
    }

    #[test]
    fn member_depending_on_sibling_is_a_cycle() {
        let mut b = OptionGraphBuilder::new();
        b.choice("g", ChoiceMode::Mandatory);
        b.bool("X").choice_group("g");
        b.bool("Y").choice_group("g").depends(Expr::sym("X"));
        let graph = b.build().unwrap();
        assert!(!cyclic_options(&graph).is_empty());
    }

    #[test]
    fn undeclared_symbols_are_not_edges() {
        let mut b = OptionGraphBuilder::new();
        b.bool("A").depends(Expr::sym("GHOST"));
        let graph = b.build().unwrap();
        assert!(cyclic_options(&graph).is_empty());
    }
}

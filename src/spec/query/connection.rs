//! Connection-directive driven document rewriting.
//!
//! Two passes over an immutable [`ast::Document`]: a scanner that collects
//! the names of fields flagged with the connection directive, then a rewrite
//! that merges the canonical `edges` / `pageInfo` sub-selections into every
//! field carrying one of those names. Caller-authored sub-selections are
//! kept in place; the templates only contribute fields that are absent.

use std::collections::HashSet;

use apollo_compiler::ast;
use apollo_compiler::name;
use apollo_compiler::Name;
use apollo_compiler::Node;

/// Rewrite `document` so that every field flagged with `directive_name`
/// selects the full connection shape.
///
/// The input document is never mutated; the returned document shares
/// untouched nodes with it. The directive itself is left in place for
/// downstream layers to strip or ignore.
pub fn expand_connections(document: &ast::Document, directive_name: &Name) -> ast::Document {
    let connection_fields = connection_field_names(document, directive_name);
    if connection_fields.is_empty() {
        return document.clone();
    }

    let mut rewritten = ast::Document::new();
    rewritten.definitions = document
        .definitions
        .iter()
        .map(|definition| match definition {
            ast::Definition::OperationDefinition(operation) => {
                let selection_set =
                    rewrite_selection_set(&operation.selection_set, &connection_fields);
                let mut operation = operation.clone();
                operation.make_mut().selection_set = selection_set;
                ast::Definition::OperationDefinition(operation)
            }
            ast::Definition::FragmentDefinition(fragment) => {
                let selection_set =
                    rewrite_selection_set(&fragment.selection_set, &connection_fields);
                let mut fragment = fragment.clone();
                fragment.make_mut().selection_set = selection_set;
                ast::Definition::FragmentDefinition(fragment)
            }
            other => other.clone(),
        })
        .collect();
    rewritten
}

/// The enclosing nodes of the selection currently being scanned, outermost
/// first. Only the innermost entry decides whether a directive occurrence
/// flags a field.
enum Ancestor<'doc> {
    Operation,
    Fragment,
    Field(&'doc ast::Field),
    InlineFragment,
    FragmentSpread,
}

impl Ancestor<'_> {
    const fn kind(&self) -> &'static str {
        match self {
            Ancestor::Operation => "operation",
            Ancestor::Fragment => "fragment definition",
            Ancestor::Field(_) => "field",
            Ancestor::InlineFragment => "inline fragment",
            Ancestor::FragmentSpread => "fragment spread",
        }
    }
}

/// First pass: collect the names of all fields carrying the directive,
/// anywhere in the document. The set is keyed by name only, so two fields
/// sharing a name are indistinguishable here and both get rewritten.
fn connection_field_names(document: &ast::Document, directive_name: &Name) -> HashSet<Name> {
    let mut connection_fields = HashSet::new();
    for definition in &document.definitions {
        match definition {
            ast::Definition::OperationDefinition(operation) => {
                let mut ancestors = vec![Ancestor::Operation];
                record_flagged_field(
                    &operation.directives,
                    &ancestors,
                    directive_name,
                    &mut connection_fields,
                );
                scan_selection_set(
                    &operation.selection_set,
                    &mut ancestors,
                    directive_name,
                    &mut connection_fields,
                );
            }
            ast::Definition::FragmentDefinition(fragment) => {
                let mut ancestors = vec![Ancestor::Fragment];
                record_flagged_field(
                    &fragment.directives,
                    &ancestors,
                    directive_name,
                    &mut connection_fields,
                );
                scan_selection_set(
                    &fragment.selection_set,
                    &mut ancestors,
                    directive_name,
                    &mut connection_fields,
                );
            }
            _ => {}
        }
    }
    connection_fields
}

fn scan_selection_set<'doc>(
    selections: &'doc [ast::Selection],
    ancestors: &mut Vec<Ancestor<'doc>>,
    directive_name: &Name,
    connection_fields: &mut HashSet<Name>,
) {
    for selection in selections {
        match selection {
            ast::Selection::Field(field) => {
                ancestors.push(Ancestor::Field(field));
                record_flagged_field(
                    &field.directives,
                    ancestors,
                    directive_name,
                    connection_fields,
                );
                scan_selection_set(
                    &field.selection_set,
                    ancestors,
                    directive_name,
                    connection_fields,
                );
                ancestors.pop();
            }
            ast::Selection::FragmentSpread(spread) => {
                ancestors.push(Ancestor::FragmentSpread);
                record_flagged_field(
                    &spread.directives,
                    ancestors,
                    directive_name,
                    connection_fields,
                );
                ancestors.pop();
            }
            ast::Selection::InlineFragment(inline) => {
                ancestors.push(Ancestor::InlineFragment);
                record_flagged_field(
                    &inline.directives,
                    ancestors,
                    directive_name,
                    connection_fields,
                );
                scan_selection_set(
                    &inline.selection_set,
                    ancestors,
                    directive_name,
                    connection_fields,
                );
                ancestors.pop();
            }
        }
    }
}

fn record_flagged_field(
    directives: &ast::DirectiveList,
    ancestors: &[Ancestor<'_>],
    directive_name: &Name,
    connection_fields: &mut HashSet<Name>,
) {
    for directive in directives.iter() {
        if directive.name != *directive_name {
            continue;
        }
        match ancestors.last() {
            Some(Ancestor::Field(field)) => {
                connection_fields.insert(field.name.clone());
            }
            Some(host) => {
                tracing::trace!(
                    directive = directive_name.as_str(),
                    host = host.kind(),
                    "connection directive attached to a non-field selection, skipped"
                );
            }
            None => {}
        }
    }
}

/// Second pass: rebuild selection sets bottom-up, expanding every field whose
/// name was recorded by the scanner.
fn rewrite_selection_set(
    selections: &[ast::Selection],
    connection_fields: &HashSet<Name>,
) -> Vec<ast::Selection> {
    selections
        .iter()
        .map(|selection| match selection {
            ast::Selection::Field(field) => {
                let mut children = rewrite_selection_set(&field.selection_set, connection_fields);
                if connection_fields.contains(&field.name) {
                    tracing::trace!(field = field.name.as_str(), "expanding connection field");
                    children = expand_connection_field(children);
                }
                let mut field = field.clone();
                field.make_mut().selection_set = children;
                ast::Selection::Field(field)
            }
            ast::Selection::InlineFragment(inline) => {
                let children = rewrite_selection_set(&inline.selection_set, connection_fields);
                let mut inline = inline.clone();
                inline.make_mut().selection_set = children;
                ast::Selection::InlineFragment(inline)
            }
            ast::Selection::FragmentSpread(spread) => {
                ast::Selection::FragmentSpread(spread.clone())
            }
        })
        .collect()
}

/// Rebuild a flagged field's selection set as: all original sub-selections
/// except `edges` / `pageInfo` in their original order, then the merged
/// `edges`, then the merged `pageInfo`. A flagged leaf field gets the
/// templates verbatim.
fn expand_connection_field(selections: Vec<ast::Selection>) -> Vec<ast::Selection> {
    let edges_name = name!("edges");
    let page_info_name = name!("pageInfo");

    let edges = merge_with_template(find_field(&selections, &edges_name), &edges_template());
    let page_info = merge_with_template(
        find_field(&selections, &page_info_name),
        &page_info_template(),
    );

    let mut rewritten: Vec<ast::Selection> = selections
        .into_iter()
        .filter(|selection| {
            !is_field_named(selection, &edges_name) && !is_field_named(selection, &page_info_name)
        })
        .collect();
    rewritten.push(ast::Selection::Field(edges));
    rewritten.push(ast::Selection::Field(page_info));
    rewritten
}

fn find_field<'sel>(
    selections: &'sel [ast::Selection],
    name: &Name,
) -> Option<&'sel Node<ast::Field>> {
    selections.iter().find_map(|selection| match selection {
        ast::Selection::Field(field) if field.name == *name => Some(field),
        _ => None,
    })
}

fn is_field_named(selection: &ast::Selection, name: &Name) -> bool {
    matches!(selection, ast::Selection::Field(field) if field.name == *name)
}

/// Merge a caller-authored field with its template. The caller's node wins:
/// its alias, arguments and directives are kept, and its sub-selections stay
/// in place; the template contributes the sub-selections that are absent by
/// name.
fn merge_with_template(
    existing: Option<&Node<ast::Field>>,
    template: &Node<ast::Field>,
) -> Node<ast::Field> {
    match existing {
        None => template.clone(),
        Some(existing) => {
            let selection_set =
                merge_selection_sets(&existing.selection_set, &template.selection_set);
            let mut merged = existing.clone();
            merged.make_mut().selection_set = selection_set;
            merged
        }
    }
}

/// Union of two selection sets by field name. Existing entries are preserved
/// in place; for a name both sides define, the child sets are merged the same
/// way. Non-field selections on the existing side pass through untouched.
fn merge_selection_sets(
    existing: &[ast::Selection],
    template: &[ast::Selection],
) -> Vec<ast::Selection> {
    let mut merged = existing.to_vec();
    for template_selection in template {
        // Templates are hand-authored and only ever contain fields.
        let ast::Selection::Field(template_field) = template_selection else {
            continue;
        };
        let matching = merged.iter_mut().find_map(|selection| match selection {
            ast::Selection::Field(field) if field.name == template_field.name => Some(field),
            _ => None,
        });
        match matching {
            Some(field) => {
                let selection_set =
                    merge_selection_sets(&field.selection_set, &template_field.selection_set);
                field.make_mut().selection_set = selection_set;
            }
            None => merged.push(template_selection.clone()),
        }
    }
    merged
}

fn edges_template() -> Node<ast::Field> {
    template_field(name!("edges"), vec![name!("cursor")])
}

fn page_info_template() -> Node<ast::Field> {
    template_field(
        name!("pageInfo"),
        vec![
            name!("hasNextPage"),
            name!("hasPreviousPage"),
            name!("startCursor"),
            name!("endCursor"),
        ],
    )
}

fn template_field(name: Name, properties: Vec<Name>) -> Node<ast::Field> {
    Node::new(ast::Field {
        alias: None,
        name,
        arguments: Vec::new(),
        directives: ast::DirectiveList(vec![]),
        selection_set: properties
            .into_iter()
            .map(|property| {
                ast::Selection::Field(Node::new(ast::Field {
                    alias: None,
                    name: property,
                    arguments: Vec::new(),
                    directives: ast::DirectiveList(vec![]),
                    selection_set: Vec::new(),
                }))
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ast::Document {
        ast::Document::parse(source, "query.graphql").expect("valid test document")
    }

    /// Documents are compared through their serialization: both sides go
    /// through the same printer, so equal text means equal trees.
    fn assert_expands_to(input: &str, expected: &str) {
        let expanded = expand_connections(&parse(input), &name!("myConnection"));
        assert_eq!(expanded.to_string(), parse(expected).to_string());
    }

    #[test]
    fn adds_pagination_fields_to_an_existing_edges_selection() {
        assert_expands_to(
            "{ robots @myConnection { edges { node { id } } } }",
            "{
                robots @myConnection {
                    edges { node { id } cursor }
                    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                }
            }",
        );
    }

    #[test]
    fn expands_a_leaf_connection_field() {
        assert_expands_to(
            "{ robots @myConnection }",
            "{
                robots @myConnection {
                    edges { cursor }
                    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                }
            }",
        );
    }

    #[test]
    fn is_idempotent() {
        let input = parse("{ robots @myConnection { edges { node { id } } } }");
        let once = expand_connections(&input, &name!("myConnection"));
        let twice = expand_connections(&once, &name!("myConnection"));
        assert_eq!(once.to_string(), twice.to_string());
    }

    #[test]
    fn preserves_other_selections_in_their_original_order() {
        assert_expands_to(
            "{
                robots @myConnection {
                    totalCount
                    edges { node { id } }
                    filteredCount
                }
            }",
            "{
                robots @myConnection {
                    totalCount
                    filteredCount
                    edges { node { id } cursor }
                    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                }
            }",
        );
    }

    #[test]
    fn merges_a_partial_page_info_without_duplicates() {
        assert_expands_to(
            "{
                robots @myConnection {
                    pageInfo { hasNextPage }
                    edges { cursor node { id } }
                }
            }",
            "{
                robots @myConnection {
                    edges { cursor node { id } }
                    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                }
            }",
        );
    }

    #[test]
    fn leaves_documents_without_the_directive_untouched() {
        let input = parse(
            "query Robots {
                robots { edges { node { id } } }
                factories { id robots { id } }
            }",
        );
        let expanded = expand_connections(&input, &name!("myConnection"));
        assert_eq!(expanded.to_string(), input.to_string());
    }

    #[test]
    fn ignores_the_directive_on_non_field_hosts() {
        let input = parse(
            "query Robots @myConnection {
                ... @myConnection { robots { id } }
            }",
        );
        let expanded = expand_connections(&input, &name!("myConnection"));
        assert_eq!(expanded.to_string(), input.to_string());
    }

    #[test]
    fn only_reacts_to_the_configured_directive_name() {
        let input = parse("{ robots @connection { edges { node { id } } } }");
        let expanded = expand_connections(&input, &name!("myConnection"));
        assert_eq!(expanded.to_string(), input.to_string());
    }

    #[test]
    fn expands_every_field_sharing_a_flagged_name() {
        // Augmentation is keyed by name only: the nested `robots` field gets
        // the connection shape even though the directive is on the top one.
        assert_expands_to(
            "{
                robots @myConnection { edges { node { id } } }
                factory { robots { totalCount } }
            }",
            "{
                robots @myConnection {
                    edges { node { id } cursor }
                    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                }
                factory {
                    robots {
                        totalCount
                        edges { cursor }
                        pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                    }
                }
            }",
        );
    }

    #[test]
    fn expands_flagged_fields_inside_fragment_definitions() {
        assert_expands_to(
            "query { owner { ...OwnerParts } }
            fragment OwnerParts on Owner {
                robots @myConnection { edges { node { id } } }
            }",
            "query { owner { ...OwnerParts } }
            fragment OwnerParts on Owner {
                robots @myConnection {
                    edges { node { id } cursor }
                    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                }
            }",
        );
    }

    #[test]
    fn keeps_arguments_and_directives_on_merged_fields() {
        assert_expands_to(
            "{
                robots(first: 10) @myConnection {
                    edges @include(if: true) { node { id } }
                }
            }",
            "{
                robots(first: 10) @myConnection {
                    edges @include(if: true) { node { id } cursor }
                    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                }
            }",
        );
    }

    #[test]
    fn matches_edges_by_name_even_when_aliased() {
        // Field identity is its name, not its alias: `results: edges` is the
        // `edges` selection, so the template merges into it and the alias
        // survives.
        assert_expands_to(
            "{ robots @myConnection { results: edges { node { id } } } }",
            "{
                robots @myConnection {
                    results: edges { node { id } cursor }
                    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                }
            }",
        );
    }

    #[test]
    fn expands_flagged_fields_nested_inside_a_connection() {
        // A flagged field deeper in the tree is expanded before its parent.
        assert_expands_to(
            "{
                robots @myConnection {
                    edges { node { id parts @myConnection } }
                }
            }",
            "{
                robots @myConnection {
                    edges {
                        node {
                            id
                            parts @myConnection {
                                edges { cursor }
                                pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                            }
                        }
                        cursor
                    }
                    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                }
            }",
        );
    }

    #[test]
    fn scanner_collects_flagged_field_names() {
        let document = parse(
            "{
                robots @myConnection { edges { node { id } } }
                factories @myConnection
                owner { name }
            }",
        );
        let names = connection_field_names(&document, &name!("myConnection"));
        assert_eq!(names.len(), 2);
        assert!(names.contains(&name!("robots")));
        assert!(names.contains(&name!("factories")));
    }
}

//! Type-expression resolver: turns a
//! [`tyck_ast::TypeNode`] into a [`TypeId`].
//!
//! `resolve_type_annotation` is the single entry point — identifiers,
//! compound forms, generics, and the keyof/indexed-access/conditional/
//! mapped/template/predicate family all go through it, rather than
//! splitting "simple" and "rich" resolution into two near-duplicate
//! walks.

use tyck_ast::{Keyword, Modifier as AstModifier, ObjectMember, TNode, TypeNode};
use tyck_common::{diagnostics::diagnostic_codes, diagnostics::diagnostic_messages, format_message};
use tyck_types::{ConditionalType, IndexSignature, MappedType, Modifier, ObjectType, Primitive, Signature, TemplatePart, Type, Value};

use crate::checker::Checker;
use crate::environment::EnvId;

impl Checker {
    /// Resolves a type annotation as written in source into a `TypeId`,
    /// looking names up in `env` (type parameter, then type alias,
    /// → primitive, in that order — type parameters live in their own
    /// table so this is really "type parameter table, then alias table").
    pub fn resolve_type_annotation(&mut self, node: &TNode, env: EnvId) -> tyck_common::TypeId {
        match &node.kind {
            TypeNode::Keyword(kw) => self.resolve_keyword(*kw),
            TypeNode::Reference { name, type_args } => self.resolve_reference(name, type_args, env, node.span),
            TypeNode::Literal(value) => self.resolve_literal(value),
            TypeNode::Array(elem) => {
                let elem_ty = self.resolve_type_annotation(elem, env);
                self.arena.alloc(Type::Array(elem_ty))
            }
            TypeNode::Tuple(elements) => self.resolve_tuple(elements, env),
            TypeNode::ObjectLiteral(members) => self.resolve_object_literal(members, env),
            TypeNode::Union(parts) => {
                let ids: Vec<_> = parts.iter().map(|p| self.resolve_type_annotation(p, env)).collect();
                tyck_types::new_union(&mut self.arena, ids)
            }
            TypeNode::Intersection(parts) => {
                let ids: Vec<_> = parts.iter().map(|p| self.resolve_type_annotation(p, env)).collect();
                tyck_types::new_intersection(&mut self.arena, ids)
            }
            TypeNode::Function {
                type_params,
                params,
                return_type,
            } => self.resolve_callable(type_params, params, return_type, env, false),
            TypeNode::Constructor {
                type_params,
                params,
                return_type,
            } => self.resolve_callable(type_params, params, return_type, env, true),
            TypeNode::Keyof(operand) => {
                let operand_ty = self.resolve_type_annotation(operand, env);
                tyck_types::keyof(&mut self.arena, operand_ty)
            }
            TypeNode::IndexedAccess { object, index } => {
                let object_ty = self.resolve_type_annotation(object, env);
                let index_ty = self.resolve_type_annotation(index, env);
                tyck_types::indexed_access(&mut self.arena, object_ty, index_ty)
            }
            TypeNode::Mapped {
                param_name,
                constraint,
                name_remap,
                value,
                readonly_mod,
                optional_mod,
            } => self.resolve_mapped(param_name, constraint, name_remap.as_deref(), value, *readonly_mod, *optional_mod, env),
            TypeNode::Conditional {
                check,
                extends,
                then_branch,
                else_branch,
            } => {
                let check_ty = self.resolve_type_annotation(check, env);
                let extends_ty = self.resolve_type_annotation(extends, env);
                let true_ty = self.resolve_type_annotation(then_branch, env);
                let false_ty = self.resolve_type_annotation(else_branch, env);
                tyck_types::compute_conditional(
                    &mut self.arena,
                    ConditionalType {
                        check: check_ty,
                        extends: extends_ty,
                        true_branch: true_ty,
                        false_branch: false_ty,
                    },
                )
            }
            // `infer X` only has meaning inside a conditional's `extends`
            // clause, which this checker's assignability-based
            // conditional evaluator doesn't perform pattern
            // matching for; treated as an ordinary type-parameter
            // reference scoped to the conditional.
            TypeNode::Infer(name) => self
                .envs
                .resolve_type_parameter(env, name)
                .unwrap_or_else(|| self.arena.any()),
            TypeNode::TemplateLiteral { quasis, types } => self.resolve_template_literal(quasis, types, env),
            TypeNode::Predicate { param_name, asserted } => {
                let asserted_ty = self.resolve_type_annotation(asserted, env);
                self.arena.alloc(Type::TypePredicate {
                    param_name: param_name.clone(),
                    ty: asserted_ty,
                })
            }
            TypeNode::TypeofQuery(name) => match self.envs.resolve(env, name) {
                Some(binding) => binding.ty,
                None => {
                    self.error(
                        node.span,
                        diagnostic_codes::UNDEFINED_VARIABLE,
                        format_message(diagnostic_messages::UNDEFINED_VARIABLE, &[name]),
                    );
                    self.arena.any()
                }
            },
            TypeNode::Parenthesized(inner) => self.resolve_type_annotation(inner, env),
        }
    }

    fn resolve_keyword(&mut self, kw: Keyword) -> tyck_common::TypeId {
        let p = match kw {
            Keyword::String => Primitive::String,
            Keyword::Number => Primitive::Number,
            Keyword::Boolean => Primitive::Boolean,
            Keyword::Any => Primitive::Any,
            Keyword::Unknown => Primitive::Unknown,
            Keyword::Never => Primitive::Never,
            Keyword::Void => Primitive::Void,
            Keyword::Null => Primitive::Null,
            Keyword::Undefined => Primitive::Undefined,
            // `object`, `symbol`, `bigint` have no dedicated primitive in
            // this checker's narrower type algebra (conditional types don't
            // mention them explicitly; treated as `any` rather than left
            // unresolved).
            Keyword::Object | Keyword::Symbol | Keyword::BigInt => Primitive::Any,
        };
        self.arena.primitive(p)
    }

    fn resolve_literal(&mut self, value: &Value) -> tyck_common::TypeId {
        self.arena.alloc(Type::Literal(tyck_types::LiteralType { value: value.clone() }))
    }

    fn resolve_tuple(&mut self, elements: &[tyck_ast::TupleElement], env: EnvId) -> tyck_common::TypeId {
        let mut tuple_elements = Vec::with_capacity(elements.len());
        let mut optional = Vec::with_capacity(elements.len());
        let mut rest = None;
        for el in elements {
            let ty = self.resolve_type_annotation(&el.ty, env);
            if el.rest {
                // A `...T[]` tail: `ty` was resolved from the element's
                // own annotation, which is already the array type, so
                // unwrap one `Array` layer to get the rest element type.
                rest = Some(match self.arena.get(ty) {
                    Type::Array(inner) => *inner,
                    _ => ty,
                });
                continue;
            }
            tuple_elements.push(ty);
            optional.push(el.optional);
        }
        self.arena.alloc(Type::Tuple(tyck_types::TupleType {
            elements: tuple_elements,
            optional,
            rest,
        }))
    }

    fn resolve_object_literal(&mut self, members: &[ObjectMember], env: EnvId) -> tyck_common::TypeId {
        let mut obj = ObjectType::empty();
        for member in members {
            match member {
                ObjectMember::Property(prop) => {
                    let ty = self.resolve_type_annotation(&prop.ty, env);
                    obj.properties.insert(prop.name.clone(), ty);
                    if prop.optional {
                        obj.optional.insert(prop.name.clone());
                    }
                    if prop.readonly {
                        obj.readonly.insert(prop.name.clone());
                    }
                }
                ObjectMember::CallSignature {
                    type_params,
                    params,
                    return_type,
                } => {
                    let sig = self.resolve_signature(type_params, params, return_type, env);
                    obj.call_signatures.push(sig);
                }
                ObjectMember::ConstructSignature {
                    type_params,
                    params,
                    return_type,
                } => {
                    let sig = self.resolve_signature(type_params, params, return_type, env);
                    obj.construct_signatures.push(sig);
                }
                ObjectMember::IndexSignature {
                    key_type,
                    value_type,
                    readonly,
                    ..
                } => {
                    let key = self.resolve_type_annotation(key_type, env);
                    let value = self.resolve_type_annotation(value_type, env);
                    obj.index_signatures.push(IndexSignature {
                        key,
                        value,
                        readonly: *readonly,
                    });
                }
            }
        }
        self.arena.alloc(Type::Object(obj))
    }

    fn resolve_callable(
        &mut self,
        type_params: &[tyck_ast::TypeParamDecl],
        params: &[tyck_ast::Param],
        return_type: &TNode,
        env: EnvId,
        is_constructor: bool,
    ) -> tyck_common::TypeId {
        let sig = self.resolve_signature(type_params, params, return_type, env);
        let mut obj = ObjectType::empty();
        if is_constructor {
            obj.construct_signatures.push(sig);
        } else {
            obj.call_signatures.push(sig);
        }
        self.arena.alloc(Type::Object(obj))
    }

    /// Resolves one signature's parameter/return types in a child scope
    /// binding its own type parameters (if any).
    pub(crate) fn resolve_signature(
        &mut self,
        type_params: &[tyck_ast::TypeParamDecl],
        params: &[tyck_ast::Param],
        return_type: &TNode,
        env: EnvId,
    ) -> Signature {
        let sig_env = if type_params.is_empty() {
            env
        } else {
            let child = self.envs.push_child(env);
            self.bind_type_params(type_params, child);
            child
        };

        let mut param_types = Vec::with_capacity(params.len());
        let mut optional = Vec::with_capacity(params.len());
        let mut variadic = false;
        let mut rest_type = None;
        for p in params {
            let ty = match &p.ty {
                Some(t) => self.resolve_type_annotation(t, sig_env),
                None => self.arena.any(),
            };
            if p.rest {
                variadic = true;
                rest_type = Some(match self.arena.get(ty) {
                    Type::Array(inner) => *inner,
                    _ => {
                        self.error(
                            p.default.as_ref().map(|d| d.span).unwrap_or_default(),
                            diagnostic_codes::REST_PARAM_MUST_BE_ARRAY,
                            format_message(
                                diagnostic_messages::REST_PARAM_MUST_BE_ARRAY,
                                &[&tyck_types::display_type(&self.arena, ty)],
                            ),
                        );
                        self.arena.any()
                    }
                });
                continue;
            }
            param_types.push(ty);
            optional.push(p.optional);
        }
        let ret = self.resolve_type_annotation(return_type, sig_env);
        Signature {
            param_types,
            optional,
            return_type: ret,
            variadic,
            rest_type,
        }
    }

    /// Binds each declared type parameter into `env`, resolving its
    /// constraint/default in the same scope so parameters may reference
    /// earlier parameters (`<T, U extends T>`).
    pub(crate) fn bind_type_params(&mut self, decls: &[tyck_ast::TypeParamDecl], env: EnvId) -> Vec<tyck_common::TypeId> {
        let mut ids = Vec::with_capacity(decls.len());
        for decl in decls {
            let constraint = decl.constraint.as_ref().map(|c| self.resolve_type_annotation(c, env));
            let default = decl.default.as_ref().map(|d| self.resolve_type_annotation(d, env));
            let id = self.arena.alloc(Type::TypeParameter(tyck_types::TypeParameter {
                name: decl.name.clone(),
                constraint,
                default,
            }));
            self.envs.define_type_parameter(env, &decl.name, id);
            ids.push(id);
        }
        ids
    }

    fn resolve_mapped(
        &mut self,
        param_name: &str,
        constraint: &TNode,
        name_remap: Option<&TNode>,
        value: &TNode,
        readonly_mod: AstModifier,
        optional_mod: AstModifier,
        env: EnvId,
    ) -> tyck_common::TypeId {
        let constraint_ty = self.resolve_type_annotation(constraint, env);
        let child = self.envs.push_child(env);
        let param_id = self.arena.alloc(Type::TypeParameter(tyck_types::TypeParameter {
            name: param_name.to_string(),
            constraint: Some(constraint_ty),
            default: None,
        }));
        self.envs.define_type_parameter(child, param_name, param_id);
        let value_ty = self.resolve_type_annotation(value, child);
        let name_remap_ty = name_remap.map(|n| self.resolve_type_annotation(n, child));
        tyck_types::expand_mapped(
            &mut self.arena,
            MappedType {
                param_name: param_name.to_string(),
                param_id,
                constraint: constraint_ty,
                value: value_ty,
                name_remap: name_remap_ty,
                optional_mod: convert_modifier(optional_mod),
                readonly_mod: convert_modifier(readonly_mod),
            },
        )
    }

    fn resolve_template_literal(&mut self, quasis: &[String], types: &[TNode], env: EnvId) -> tyck_common::TypeId {
        let mut parts = Vec::with_capacity(quasis.len() + types.len());
        let mut types_iter = types.iter();
        for (i, quasi) in quasis.iter().enumerate() {
            if !quasi.is_empty() {
                parts.push(TemplatePart::Literal(quasi.clone()));
            }
            if i < types.len() {
                if let Some(t) = types_iter.next() {
                    let ty = self.resolve_type_annotation(t, env);
                    parts.push(TemplatePart::Type(ty));
                }
            }
        }
        tyck_types::compute_template_literal(&mut self.arena, parts)
    }

    /// Resolves a named reference, optionally parameterized
    /// (generic references): type parameter table, then alias table,
    /// with `Array`/`Promise` special-cased only insofar as they're
    /// ordinary generic aliases installed by the builtin loader — no
    /// separate code path is needed for them.
    fn resolve_reference(&mut self, name: &str, type_args: &[TNode], env: EnvId, span: tyck_common::Span) -> tyck_common::TypeId {
        if type_args.is_empty() {
            if let Some(id) = self.envs.resolve_type_parameter(env, name) {
                return self.arena.alloc(Type::ParameterRef(id));
            }
        }

        // Self-reference to the class/alias currently being declared.
        if let Some(frame) = self.self_reference_stack.iter().rev().find(|f| f.name == name) {
            let arg_ids: Vec<_> = type_args.iter().map(|a| self.resolve_type_annotation(a, env)).collect();
            if arg_ids.len() == frame.own_params.len()
                && arg_ids.iter().zip(frame.own_params.iter()).all(|(a, b)| tyck_types::equals(&self.arena, *a, *b))
            {
                return frame.placeholder;
            }
            return self.arena.alloc(Type::GenericForwardReference {
                name: name.to_string(),
                args: arg_ids,
            });
        }

        let Some(resolved) = self.envs.resolve_type(env, name) else {
            self.error(
                span,
                diagnostic_codes::UNKNOWN_TYPE_NAME,
                format_message(diagnostic_messages::UNKNOWN_TYPE_NAME, &[name]),
            );
            return self.arena.any();
        };

        if type_args.is_empty() {
            return resolved;
        }

        match self.arena.get(resolved).clone() {
            Type::Generic(generic) => {
                if type_args.len() != generic.params.len() {
                    self.error(
                        span,
                        diagnostic_codes::GENERIC_ARITY_MISMATCH,
                        format_message(
                            diagnostic_messages::GENERIC_ARITY_MISMATCH,
                            &[name, &generic.params.len().to_string(), &type_args.len().to_string()],
                        ),
                    );
                    return self.arena.any();
                }
                let mut arg_ids = Vec::with_capacity(type_args.len());
                for (arg_node, param_id) in type_args.iter().zip(generic.params.iter()) {
                    let arg_ty = self.resolve_type_annotation(arg_node, env);
                    if let Type::TypeParameter(tp) = self.arena.get(*param_id).clone() {
                        if let Some(constraint) = tp.constraint {
                            if !tyck_types::is_assignable(&self.arena, arg_ty, constraint) {
                                self.error(
                                    arg_node.span,
                                    diagnostic_codes::GENERIC_CONSTRAINT_VIOLATION,
                                    format_message(
                                        diagnostic_messages::GENERIC_CONSTRAINT_VIOLATION,
                                        &[
                                            &tyck_types::display_type(&self.arena, arg_ty),
                                            &tyck_types::display_type(&self.arena, constraint),
                                            &tp.name,
                                        ],
                                    ),
                                );
                            }
                        }
                    }
                    arg_ids.push(arg_ty);
                }
                tyck_types::instantiate_generic(&mut self.arena, resolved, &arg_ids)
            }
            Type::ForwardReference(_) => {
                let arg_ids: Vec<_> = type_args.iter().map(|a| self.resolve_type_annotation(a, env)).collect();
                self.arena.alloc(Type::GenericForwardReference {
                    name: name.to_string(),
                    args: arg_ids,
                })
            }
            _ => {
                self.error(
                    span,
                    diagnostic_codes::NOT_A_GENERIC_TYPE,
                    format_message(diagnostic_messages::NOT_A_GENERIC_TYPE, &[name]),
                );
                self.arena.any()
            }
        }
    }
}

fn convert_modifier(m: AstModifier) -> Modifier {
    match m {
        AstModifier::Unchanged => Modifier::Unchanged,
        AstModifier::Add => Modifier::Add,
        AstModifier::Remove => Modifier::Remove,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyck_ast::node::Node;
    use tyck_common::{CheckerOptions, Span};

    fn keyword(kw: Keyword) -> TNode {
        Node::new(Span::dummy(), TypeNode::Keyword(kw))
    }

    #[test]
    fn resolves_primitive_keywords() {
        let mut checker = Checker::new(CheckerOptions::default());
        let env = checker.root_env();
        let ty = checker.resolve_type_annotation(&keyword(Keyword::String), env);
        assert!(matches!(checker.arena.get(ty), Type::Primitive(Primitive::String)));
    }

    #[test]
    fn unknown_reference_degrades_to_any_and_reports() {
        let mut checker = Checker::new(CheckerOptions::default());
        let env = checker.root_env();
        let node: TNode = Node::new(
            Span::dummy(),
            TypeNode::Reference {
                name: "Nope".to_string(),
                type_args: vec![],
            },
        );
        let ty = checker.resolve_type_annotation(&node, env);
        assert!(matches!(checker.arena.get(ty), Type::Primitive(Primitive::Any)));
        assert_eq!(checker.diagnostics.len(), 1);
        assert_eq!(checker.diagnostics[0].code, diagnostic_codes::UNKNOWN_TYPE_NAME);
    }

    #[test]
    fn array_type_resolves_to_array_of_element() {
        let mut checker = Checker::new(CheckerOptions::default());
        let env = checker.root_env();
        let node: TNode = Node::new(Span::dummy(), TypeNode::Array(Box::new(keyword(Keyword::Number))));
        let ty = checker.resolve_type_annotation(&node, env);
        match checker.arena.get(ty) {
            Type::Array(elem) => assert!(matches!(checker.arena.get(*elem), Type::Primitive(Primitive::Number))),
            other => panic!("expected Array, got {other:?}"),
        }
    }
}

//! Declaration checker: Pass 1 hoists every
//! top-level type alias/interface/enum/class/function signature before
//! Pass 2 visits a single statement.
//!
//! Pass 1 runs in two passes of its own: 1a pre-registers a
//! `ForwardReference` placeholder `TypeId` for every type-level name so
//! mutually recursive declarations resolve each other by name, then 1b
//! resolves each declaration's real type and patches its placeholder in
//! place with [`tyck_types::TypeArena::replace`].

use rustc_hash::FxHashMap;
use tyck_ast::{ClassDecl, ClassMember, Decl, EnumDecl, FunctionDecl, InterfaceDecl, Program, Stmt, TypeAliasDecl};
use tyck_common::{diagnostics::diagnostic_codes, diagnostics::diagnostic_messages, format_message, Span};
use tyck_types::{ClassMeta, EnumMemberType, EnumType, EnumValue, ObjectType, Primitive, Type, Value};

use crate::checker::{Checker, SelfReference};
use crate::environment::EnvId;

impl Checker {
    /// Runs Pass 1 over every top-level statement, in source order.
    pub fn hoist_program(&mut self, program: &Program) {
        let root = self.root_env();
        let placeholders = self.preregister_type_names(program, root);
        for stmt in &program.statements {
            if let Stmt::Decl(decl) = &stmt.kind {
                self.hoist_decl(decl, root, &placeholders);
                if let Some(ty) = self.computed_type_for_decl(decl, root) {
                    stmt.set_type(ty);
                }
            }
        }
    }

    /// Both passes are expected to have patched or resolved every
    /// `ForwardReference`/`GenericForwardReference` placeholder allocated
    /// during hoisting by the time Pass 2 finishes ("`ForwardReference`
    /// and `GenericForwardReference` are resolution-time placeholders;
    /// they MUST be replaced by the end of Pass 2; lingering instances at
    /// query time surface as errors"). Called once after Pass 2 — any id
    /// still holding one is an internal invariant failure: it's degraded
    /// to `any` in place (so every other type that already references it
    /// sees `any` without being revisited) and reported as a diagnostic
    /// rather than left for a later `equals`/`is_assignable` query to
    /// silently compare by name.
    pub fn sweep_lingering_forward_references(&mut self) {
        let lingering: Vec<(tyck_common::TypeId, String)> = self
            .arena
            .ids()
            .filter_map(|id| match self.arena.get(id) {
                Type::ForwardReference(name) => Some((id, name.clone())),
                Type::GenericForwardReference { name, .. } => Some((id, name.clone())),
                _ => None,
            })
            .collect();
        for (id, name) in lingering {
            self.degrade_to_any("lingering forward reference");
            self.arena.replace(id, Type::Primitive(Primitive::Any));
            self.error(
                Span::dummy(),
                diagnostic_codes::LINGERING_FORWARD_REFERENCE,
                format_message(diagnostic_messages::LINGERING_FORWARD_REFERENCE, &[&name]),
            );
        }
    }

    /// Pass 1a: walks top-level `Decl::{Interface,TypeAlias,Enum,Class}`
    /// nodes and binds each name to a fresh `ForwardReference` in `root`,
    /// reporting duplicates immediately (function names are excluded —
    /// they live in the value namespace and support overloading).
    fn preregister_type_names(&mut self, program: &Program, root: EnvId) -> FxHashMap<String, tyck_common::TypeId> {
        let mut placeholders = FxHashMap::default();
        for stmt in &program.statements {
            let Stmt::Decl(decl) = &stmt.kind else { continue };
            let name = match decl {
                Decl::Interface(d) => &d.name,
                Decl::TypeAlias(d) => &d.name,
                Decl::Enum(d) => &d.name,
                Decl::Class(d) => &d.name,
                Decl::Function(_) => continue,
            };
            let placeholder = self.arena.alloc(Type::ForwardReference(name.clone()));
            if !self.envs.define_type_alias(root, name, placeholder) {
                self.error(
                    stmt.span,
                    diagnostic_codes::DUPLICATE_IDENTIFIER,
                    format_message(diagnostic_messages::DUPLICATE_IDENTIFIER, &[name]),
                );
                continue;
            }
            placeholders.insert(name.clone(), placeholder);
        }
        placeholders
    }

    fn hoist_decl(&mut self, decl: &Decl, root: EnvId, placeholders: &FxHashMap<String, tyck_common::TypeId>) {
        match decl {
            Decl::TypeAlias(alias) => self.hoist_type_alias(alias, root, placeholders),
            Decl::Interface(iface) => self.hoist_interface(iface, root, placeholders),
            Decl::Enum(e) => self.hoist_enum(e, root, placeholders),
            Decl::Class(class) => self.hoist_class(class, root, placeholders),
            Decl::Function(f) => self.hoist_function_signature(f, root),
        }
    }

    fn computed_type_for_decl(&self, decl: &Decl, root: EnvId) -> Option<tyck_common::TypeId> {
        let name = match decl {
            Decl::TypeAlias(d) => &d.name,
            Decl::Interface(d) => &d.name,
            Decl::Enum(d) => &d.name,
            Decl::Class(d) => &d.name,
            Decl::Function(d) => &d.name,
        };
        self.envs.resolve_type(root, name).or_else(|| self.envs.resolve(root, name).map(|b| b.ty))
    }

    fn hoist_type_alias(&mut self, alias: &TypeAliasDecl, root: EnvId, placeholders: &FxHashMap<String, tyck_common::TypeId>) {
        let Some(&placeholder) = placeholders.get(&alias.name) else { return };
        if !self.resolving_aliases.insert(alias.name.clone()) {
            return;
        }

        let resolved = if alias.type_params.is_empty() {
            self.resolve_type_annotation(&alias.value, root)
        } else {
            let child = self.envs.push_child(root);
            let params = self.bind_type_params(&alias.type_params, child);
            self.self_reference_stack.push(SelfReference {
                name: alias.name.clone(),
                own_params: params.iter().map(|p| self.arena.alloc(Type::ParameterRef(*p))).collect(),
                placeholder,
            });
            let body = self.resolve_type_annotation(&alias.value, child);
            self.self_reference_stack.pop();
            self.arena.alloc(Type::Generic(tyck_types::GenericType {
                name: alias.name.clone(),
                params,
                body,
            }))
        };

        self.resolving_aliases.remove(&alias.name);
        let patched = self.arena.get(resolved).clone();
        self.arena.replace(placeholder, patched);
    }

    fn hoist_interface(&mut self, iface: &InterfaceDecl, root: EnvId, placeholders: &FxHashMap<String, tyck_common::TypeId>) {
        let Some(&placeholder) = placeholders.get(&iface.name) else { return };

        let env = if iface.type_params.is_empty() {
            root
        } else {
            self.envs.push_child(root)
        };
        let params = if iface.type_params.is_empty() {
            Vec::new()
        } else {
            self.bind_type_params(&iface.type_params, env)
        };

        let mut obj = ObjectType::empty();
        for extend in &iface.extends {
            let parent_ty = self.resolve_type_annotation(extend, env);
            if let Type::Object(parent_obj) = self.arena.get(parent_ty).clone() {
                merge_inherited(&mut obj, &parent_obj);
            }
        }
        for member in &iface.members {
            apply_object_member(self, member, env, &mut obj);
        }
        let body = self.arena.alloc(Type::Object(obj));

        let final_ty = if params.is_empty() {
            self.arena.get(body).clone()
        } else {
            Type::Generic(tyck_types::GenericType {
                name: iface.name.clone(),
                params,
                body,
            })
        };
        self.arena.replace(placeholder, final_ty);
    }

    fn hoist_enum(&mut self, e: &EnumDecl, root: EnvId, placeholders: &FxHashMap<String, tyck_common::TypeId>) {
        let Some(&placeholder) = placeholders.get(&e.name) else { return };

        let mut members = indexmap::IndexMap::new();
        let mut member_ids = Vec::with_capacity(e.members.len());
        let mut is_numeric = true;
        let mut next_numeric = 0.0f64;
        for member in &e.members {
            let value = match &member.initializer {
                Some(init) => match self.evaluate_constant_literal(init) {
                    Some(v) => v,
                    None => {
                        self.error(
                            init.span,
                            diagnostic_codes::ENUM_MEMBER_NOT_CONSTANT,
                            diagnostic_messages::ENUM_MEMBER_NOT_CONSTANT.to_string(),
                        );
                        EnumValue::Number(next_numeric)
                    }
                },
                None => {
                    if !is_numeric {
                        self.error(
                            tyck_common::Span::dummy(),
                            diagnostic_codes::ENUM_MEMBER_MISSING_INITIALIZER,
                            diagnostic_messages::ENUM_MEMBER_MISSING_INITIALIZER.to_string(),
                        );
                    }
                    EnumValue::Number(next_numeric)
                }
            };
            match &value {
                EnumValue::Number(n) => {
                    is_numeric = true;
                    next_numeric = n + 1.0;
                }
                EnumValue::String(_) => is_numeric = false,
            }
            let member_ty = self.arena.alloc(Type::EnumMember(EnumMemberType {
                enum_name: e.name.clone(),
                member_name: member.name.clone(),
                value: value.clone(),
            }));
            members.insert(member.name.clone(), member_ty);
            member_ids.push(member_ty);
        }

        let enum_ty = EnumType {
            name: e.name.clone(),
            is_const: e.is_const,
            is_numeric,
            members,
        };
        let enum_id = self.arena.alloc(Type::Enum(enum_ty));
        let union_id = tyck_types::new_union(&mut self.arena, member_ids);
        self.arena.replace(placeholder, self.arena.get(union_id).clone());
        self.envs.define(root, &e.name, enum_id, true);
    }

    /// Evaluates a constant enum initializer (only literal
    /// expressions are constant; anything else is
    /// `ENUM_MEMBER_NOT_CONSTANT`).
    fn evaluate_constant_literal(&self, expr: &tyck_ast::ENode) -> Option<EnumValue> {
        match &expr.kind {
            tyck_ast::Expr::Literal(Value::Number(n)) => Some(EnumValue::Number(*n)),
            tyck_ast::Expr::Literal(Value::String(s)) => Some(EnumValue::String(s.clone())),
            tyck_ast::Expr::Unary {
                op: tyck_ast::UnaryOp::Neg,
                operand,
            } => match &operand.kind {
                tyck_ast::Expr::Literal(Value::Number(n)) => Some(EnumValue::Number(-n)),
                _ => None,
            },
            _ => None,
        }
    }

    fn hoist_class(&mut self, class: &ClassDecl, root: EnvId, placeholders: &FxHashMap<String, tyck_common::TypeId>) {
        let Some(&placeholder) = placeholders.get(&class.name) else { return };

        let env = if class.type_params.is_empty() {
            root
        } else {
            self.envs.push_child(root)
        };
        let params = if class.type_params.is_empty() {
            Vec::new()
        } else {
            self.bind_type_params(&class.type_params, env)
        };
        let own_param_refs: Vec<_> = params.iter().map(|p| self.arena.alloc(Type::ParameterRef(*p))).collect();
        self.self_reference_stack.push(SelfReference {
            name: class.name.clone(),
            own_params: own_param_refs,
            placeholder,
        });

        let mut instance = ObjectType::empty();
        let mut statics = ObjectType::empty();
        let mut constructor_sig = None;

        for member in &class.members {
            match member {
                ClassMember::Field {
                    name,
                    ty,
                    optional,
                    readonly,
                    is_static,
                    ..
                } => {
                    let field_ty = match ty {
                        Some(t) => self.resolve_type_annotation(t, env),
                        None => self.arena.any(),
                    };
                    let target = if *is_static { &mut statics } else { &mut instance };
                    target.properties.insert(name.clone(), field_ty);
                    if *optional {
                        target.optional.insert(name.clone());
                    }
                    if *readonly {
                        target.readonly.insert(name.clone());
                    }
                }
                ClassMember::Method { is_static, function } => {
                    if function.name == "constructor" {
                        let sig = self.resolve_signature(&function.type_params, &function.params, &return_type_or_void(function), env);
                        constructor_sig = Some(sig);
                        continue;
                    }
                    let sig = self.resolve_signature(&function.type_params, &function.params, &return_type_or_void(function), env);
                    let mut method_obj = ObjectType::empty();
                    method_obj.call_signatures.push(sig);
                    let method_ty = self.arena.alloc(Type::Object(method_obj));
                    let target = if *is_static { &mut statics } else { &mut instance };
                    target.properties.insert(function.name.clone(), method_ty);
                }
            }
        }

        self.self_reference_stack.pop();

        instance.class_meta = Some(ClassMeta {
            class_name: class.name.clone(),
            is_instance: true,
            is_constructor: false,
        });
        let instance_body = self.arena.alloc(Type::Object(instance));
        let instance_final = if params.is_empty() {
            self.arena.get(instance_body).clone()
        } else {
            Type::Generic(tyck_types::GenericType {
                name: class.name.clone(),
                params: params.clone(),
                body: instance_body,
            })
        };
        self.arena.replace(placeholder, instance_final);

        let ctor_sig = constructor_sig.unwrap_or_else(|| tyck_types::Signature {
            param_types: Vec::new(),
            optional: Vec::new(),
            return_type: placeholder,
            variadic: false,
            rest_type: None,
        });
        statics.construct_signatures.push(tyck_types::Signature {
            return_type: placeholder,
            ..ctor_sig
        });
        statics.class_meta = Some(ClassMeta {
            class_name: class.name.clone(),
            is_instance: false,
            is_constructor: true,
        });
        let statics_id = self.arena.alloc(Type::Object(statics));
        self.envs.define(root, &class.name, statics_id, true);
    }

    fn hoist_function_signature(&mut self, f: &FunctionDecl, root: EnvId) {
        let sig = self.resolve_signature(&f.type_params, &f.params, &return_type_or_void(f), root);
        if f.body.is_none() {
            // A bare overload signature: stash it, don't bind a value yet.
            self.envs.add_pending_overload(root, &f.name, sig);
            return;
        }

        let mut obj = ObjectType::empty();
        let overloads = self.envs.take_pending_overloads(root, &f.name);
        if overloads.is_empty() {
            obj.call_signatures.push(sig);
        } else {
            obj.call_signatures = overloads;
            self.implementation_signatures_mut().insert(f.name.clone(), sig);
        }
        let fn_ty = self.arena.alloc(Type::Object(obj));
        if !self.envs.define(root, &f.name, fn_ty, true) {
            self.error(
                tyck_common::Span::dummy(),
                diagnostic_codes::DUPLICATE_IDENTIFIER_GENERIC,
                format_message(diagnostic_messages::DUPLICATE_IDENTIFIER_GENERIC, &[&f.name]),
            );
        }
        self.envs.set_completed_overload(root, &f.name, fn_ty);
    }
}

fn return_type_or_void(f: &FunctionDecl) -> tyck_ast::TNode {
    // Annotated params/return are required; when the
    // author omitted one anyway, fall back to an explicit `void` node
    // rather than panicking the resolver on a `None`.
    f.return_type.as_ref().map(clone_tnode).unwrap_or_else(|| {
        tyck_ast::node::Node::new(tyck_common::Span::dummy(), tyck_ast::TypeNode::Keyword(tyck_ast::Keyword::Void))
    })
}

/// `TNode` holds no `Clone` impl (its `Cell<Option<TypeId>>` slot is
/// write-once per node instance); declarations reuse a return-type
/// annotation across more than one signature resolution; this rebuilds
/// an equivalent fresh node instead of aliasing the original.
fn clone_tnode(node: &tyck_ast::TNode) -> tyck_ast::TNode {
    tyck_ast::node::Node::new(node.span, clone_type_node(&node.kind))
}

fn clone_type_node(kind: &tyck_ast::TypeNode) -> tyck_ast::TypeNode {
    use tyck_ast::TypeNode as T;
    match kind {
        T::Keyword(k) => T::Keyword(*k),
        T::Reference { name, type_args } => T::Reference {
            name: name.clone(),
            type_args: type_args.iter().map(clone_tnode).collect(),
        },
        T::Literal(v) => T::Literal(v.clone()),
        T::Array(inner) => T::Array(Box::new(clone_tnode(inner))),
        T::Tuple(elements) => T::Tuple(
            elements
                .iter()
                .map(|e| tyck_ast::TupleElement {
                    label: e.label.clone(),
                    ty: clone_tnode(&e.ty),
                    optional: e.optional,
                    rest: e.rest,
                })
                .collect(),
        ),
        T::ObjectLiteral(members) => T::ObjectLiteral(members.iter().map(clone_object_member).collect()),
        T::Union(parts) => T::Union(parts.iter().map(clone_tnode).collect()),
        T::Intersection(parts) => T::Intersection(parts.iter().map(clone_tnode).collect()),
        T::Function {
            type_params,
            params,
            return_type,
        } => T::Function {
            type_params: clone_type_params(type_params),
            params: clone_params(params),
            return_type: Box::new(clone_tnode(return_type)),
        },
        T::Constructor {
            type_params,
            params,
            return_type,
        } => T::Constructor {
            type_params: clone_type_params(type_params),
            params: clone_params(params),
            return_type: Box::new(clone_tnode(return_type)),
        },
        T::Keyof(inner) => T::Keyof(Box::new(clone_tnode(inner))),
        T::IndexedAccess { object, index } => T::IndexedAccess {
            object: Box::new(clone_tnode(object)),
            index: Box::new(clone_tnode(index)),
        },
        T::Mapped {
            param_name,
            constraint,
            name_remap,
            value,
            readonly_mod,
            optional_mod,
        } => T::Mapped {
            param_name: param_name.clone(),
            constraint: Box::new(clone_tnode(constraint)),
            name_remap: name_remap.as_ref().map(|n| Box::new(clone_tnode(n))),
            value: Box::new(clone_tnode(value)),
            readonly_mod: *readonly_mod,
            optional_mod: *optional_mod,
        },
        T::Conditional {
            check,
            extends,
            then_branch,
            else_branch,
        } => T::Conditional {
            check: Box::new(clone_tnode(check)),
            extends: Box::new(clone_tnode(extends)),
            then_branch: Box::new(clone_tnode(then_branch)),
            else_branch: Box::new(clone_tnode(else_branch)),
        },
        T::Infer(name) => T::Infer(name.clone()),
        T::TemplateLiteral { quasis, types } => T::TemplateLiteral {
            quasis: quasis.clone(),
            types: types.iter().map(clone_tnode).collect(),
        },
        T::Predicate { param_name, asserted } => T::Predicate {
            param_name: param_name.clone(),
            asserted: Box::new(clone_tnode(asserted)),
        },
        T::TypeofQuery(name) => T::TypeofQuery(name.clone()),
        T::Parenthesized(inner) => T::Parenthesized(Box::new(clone_tnode(inner))),
    }
}

fn clone_object_member(member: &tyck_ast::ObjectMember) -> tyck_ast::ObjectMember {
    use tyck_ast::ObjectMember as M;
    match member {
        M::Property(p) => M::Property(tyck_ast::ObjectTypeMember {
            name: p.name.clone(),
            ty: clone_tnode(&p.ty),
            optional: p.optional,
            readonly: p.readonly,
        }),
        M::CallSignature {
            type_params,
            params,
            return_type,
        } => M::CallSignature {
            type_params: clone_type_params(type_params),
            params: clone_params(params),
            return_type: clone_tnode(return_type),
        },
        M::ConstructSignature {
            type_params,
            params,
            return_type,
        } => M::ConstructSignature {
            type_params: clone_type_params(type_params),
            params: clone_params(params),
            return_type: clone_tnode(return_type),
        },
        M::IndexSignature {
            key_name,
            key_type,
            value_type,
            readonly,
        } => M::IndexSignature {
            key_name: key_name.clone(),
            key_type: clone_tnode(key_type),
            value_type: clone_tnode(value_type),
            readonly: *readonly,
        },
    }
}

fn clone_type_params(decls: &[tyck_ast::TypeParamDecl]) -> Vec<tyck_ast::TypeParamDecl> {
    decls
        .iter()
        .map(|d| tyck_ast::TypeParamDecl {
            name: d.name.clone(),
            constraint: d.constraint.as_ref().map(clone_tnode),
            default: d.default.as_ref().map(clone_tnode),
        })
        .collect()
}

fn clone_params(params: &[tyck_ast::Param]) -> Vec<tyck_ast::Param> {
    params
        .iter()
        .map(|p| tyck_ast::Param {
            name: p.name.clone(),
            ty: p.ty.as_ref().map(clone_tnode),
            optional: p.optional,
            rest: p.rest,
            default: None,
        })
        .collect()
}

fn apply_object_member(checker: &mut Checker, member: &tyck_ast::ObjectMember, env: EnvId, obj: &mut ObjectType) {
    use tyck_ast::ObjectMember as M;
    match member {
        M::Property(p) => {
            let ty = checker.resolve_type_annotation(&p.ty, env);
            obj.properties.insert(p.name.clone(), ty);
            if p.optional {
                obj.optional.insert(p.name.clone());
            }
            if p.readonly {
                obj.readonly.insert(p.name.clone());
            }
        }
        M::CallSignature {
            type_params,
            params,
            return_type,
        } => {
            let sig = checker.resolve_signature(type_params, params, return_type, env);
            obj.call_signatures.push(sig);
        }
        M::ConstructSignature {
            type_params,
            params,
            return_type,
        } => {
            let sig = checker.resolve_signature(type_params, params, return_type, env);
            obj.construct_signatures.push(sig);
        }
        M::IndexSignature {
            key_type, value_type, readonly, ..
        } => {
            let key = checker.resolve_type_annotation(key_type, env);
            let value = checker.resolve_type_annotation(value_type, env);
            obj.index_signatures.push(tyck_types::IndexSignature {
                key,
                value,
                readonly: *readonly,
            });
        }
    }
}

/// Copies every property/optional/readonly flag from a resolved parent
/// interface's `ObjectType` into `obj` (the resulting
/// ObjectType contains every required property of J unless overridden"
/// — own members are applied after extends, so they win on conflict).
fn merge_inherited(obj: &mut ObjectType, parent: &ObjectType) {
    for (name, ty) in &parent.properties {
        obj.properties.insert(name.clone(), *ty);
    }
    for name in &parent.optional {
        obj.optional.insert(name.clone());
    }
    for name in &parent.readonly {
        obj.readonly.insert(name.clone());
    }
    obj.call_signatures.extend(parent.call_signatures.iter().cloned());
    obj.construct_signatures.extend(parent.construct_signatures.iter().cloned());
    obj.index_signatures.extend(parent.index_signatures.iter().cloned());
}

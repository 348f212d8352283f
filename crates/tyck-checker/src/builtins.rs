//! Builtin registry: installs the global
//! identifiers the resolver and declaration checker consume before a
//! program is checked — `Array`, `Promise`, `Generator`, `Iterable`,
//! `Object`, `Function` — plus primitive prototype maps.
//!
//! A real implementation loads these from a `lib.d.ts`-equivalent source
//! file; this checker has no such surrounding system (out of scope is
//! "builtin *implementation*", only their declared types are consumed),
//! so `install` constructs the minimal shapes the checker's own rules
//! reference by name.

use tyck_types::{
    ClassMeta, GenericType, IndexSignature, ObjectType, Primitive, Signature, Type, TypeArena, TypeParameter,
};

use crate::checker::Checker;

/// Declares one generic type parameter in the global scope's arena (not
/// bound into any environment — these are purely body-building helpers
/// for the generics below) and returns its declaration `TypeId`.
fn declare_param(arena: &mut TypeArena, name: &str) -> tyck_common::TypeId {
    arena.alloc(Type::TypeParameter(TypeParameter {
        name: name.to_string(),
        constraint: None,
        default: None,
    }))
}

fn param_ref(arena: &mut TypeArena, param: tyck_common::TypeId) -> tyck_common::TypeId {
    arena.alloc(Type::ParameterRef(param))
}

/// Installs every builtin this checker's feature surface references by
/// name. Must run before [`crate::check`].
pub fn install(checker: &mut Checker) {
    let root = checker.root_env();
    install_array(checker, root);
    install_promise(checker, root);
    install_generator(checker, root);
    install_iterable(checker, root);
    install_object_and_function(checker, root);
    install_primitive_prototypes(checker, root);
}

fn install_array(checker: &mut Checker, root: crate::environment::EnvId) {
    // `Array` is an ordinary type-alias binding in the root environment
    // — `Array<T>` resolves through the same generic-instantiation path
    // as any other user-defined generic alias, with no special-casing by
    // name in the resolver. This binding only exists so that lookup
    // actually finds something.
    let t = declare_param(&mut checker.arena, "T");
    let t_ref = param_ref(&mut checker.arena, t);
    let body = checker.arena.alloc(Type::Array(t_ref));
    let generic = checker.arena.alloc(Type::Generic(GenericType {
        name: "Array".to_string(),
        params: vec![t],
        body,
    }));
    checker.envs.define_type_alias(root, "Array", generic);
}

/// `Promise<T>` — represented as an opaque callable-free object carrying
/// its resolved value under a reserved property, just enough structure
/// for `async` functions to wrap/unwrap it and for explicit `Promise<T>`
/// annotations to resolve.
fn install_promise(checker: &mut Checker, root: crate::environment::EnvId) {
    let t = declare_param(&mut checker.arena, "T");
    let t_ref = param_ref(&mut checker.arena, t);
    let mut obj = ObjectType::empty();
    obj.properties.insert("__resolved".to_string(), t_ref);
    obj.class_meta = Some(ClassMeta {
        class_name: "Promise".to_string(),
        is_instance: true,
        is_constructor: false,
    });
    let body = checker.arena.alloc(Type::Object(obj));
    let generic = checker.arena.alloc(Type::Generic(GenericType {
        name: "Promise".to_string(),
        params: vec![t],
        body,
    }));
    checker.envs.define_type_alias(root, "Promise", generic);
}

/// `Generator<Yields, Returns, Next>` — same opaque-object trick as
/// `Promise`, with three reserved properties so the checker can pull the
/// annotated `TReturn` back out.
fn install_generator(checker: &mut Checker, root: crate::environment::EnvId) {
    let y = declare_param(&mut checker.arena, "Yields");
    let r = declare_param(&mut checker.arena, "Returns");
    let n = declare_param(&mut checker.arena, "Next");
    let y_ref = param_ref(&mut checker.arena, y);
    let r_ref = param_ref(&mut checker.arena, r);
    let n_ref = param_ref(&mut checker.arena, n);
    let mut obj = ObjectType::empty();
    obj.properties.insert("__yields".to_string(), y_ref);
    obj.properties.insert("__returns".to_string(), r_ref);
    obj.properties.insert("__next".to_string(), n_ref);
    obj.class_meta = Some(ClassMeta {
        class_name: "Generator".to_string(),
        is_instance: true,
        is_constructor: false,
    });
    let body = checker.arena.alloc(Type::Object(obj));
    let generic = checker.arena.alloc(Type::Generic(GenericType {
        name: "Generator".to_string(),
        params: vec![y, r, n],
        body,
    }));
    checker.envs.define_type_alias(root, "Generator", generic);
}

/// `Iterable<T>` — an index-signature-bearing object, just enough
/// structure that `is_assignable(subject, Iterable<any>)` can succeed
/// structurally for any for-of subject with a compatible shape.
fn install_iterable(checker: &mut Checker, root: crate::environment::EnvId) {
    let t = declare_param(&mut checker.arena, "T");
    let t_ref = param_ref(&mut checker.arena, t);
    let mut obj = ObjectType::empty();
    let string = checker.arena.primitive(Primitive::Number);
    obj.index_signatures.push(IndexSignature {
        key: string,
        value: t_ref,
        readonly: false,
    });
    let body = checker.arena.alloc(Type::Object(obj));
    let generic = checker.arena.alloc(Type::Generic(GenericType {
        name: "Iterable".to_string(),
        params: vec![t],
        body,
    }));
    checker.envs.define_type_alias(root, "Iterable", generic);
}

fn install_object_and_function(checker: &mut Checker, root: crate::environment::EnvId) {
    let any = checker.arena.any();
    let mut object_ty = ObjectType::empty();
    object_ty.index_signatures.push(IndexSignature {
        key: checker.arena.primitive(Primitive::String),
        value: any,
        readonly: false,
    });
    let object_id = checker.arena.alloc(Type::Object(object_ty));
    checker.envs.define_type_alias(root, "Object", object_id);
    checker.envs.define(root, "Object", object_id, true);

    let mut function_ty = ObjectType::empty();
    function_ty.call_signatures.push(Signature {
        param_types: vec![],
        optional: vec![],
        return_type: any,
        variadic: true,
        rest_type: Some(any),
    });
    let function_id = checker.arena.alloc(Type::Object(function_ty));
    checker.envs.define_type_alias(root, "Function", function_id);
    checker.envs.define(root, "Function", function_id, true);
}

/// Minimal prototype maps for `string`/`number`/`boolean` — a handful of
/// the properties real code most commonly accesses off a primitive,
/// grounding `property_access` on a primitive receiver in *something*
/// rather than always erroring.
fn install_primitive_prototypes(checker: &mut Checker, root: crate::environment::EnvId) {
    let number = checker.arena.primitive(Primitive::Number);
    let string = checker.arena.primitive(Primitive::String);
    let boolean = checker.arena.primitive(Primitive::Boolean);

    let string_to_string = single_arg_method(&mut checker.arena, string);
    let mut string_proto = ObjectType::empty();
    string_proto.properties.insert("length".to_string(), number);
    string_proto
        .properties
        .insert("toUpperCase".to_string(), string_to_string);
    string_proto
        .properties
        .insert("toLowerCase".to_string(), string_to_string);
    let string_proto_id = checker.arena.alloc(Type::Object(string_proto));
    checker.envs.set_primitive_prototype(root, Primitive::String, string_proto_id);

    let number_to_string = single_arg_method(&mut checker.arena, string);
    let mut number_proto = ObjectType::empty();
    number_proto
        .properties
        .insert("toFixed".to_string(), number_to_string);
    let number_proto_id = checker.arena.alloc(Type::Object(number_proto));
    checker.envs.set_primitive_prototype(root, Primitive::Number, number_proto_id);

    let mut boolean_proto = ObjectType::empty();
    boolean_proto
        .properties
        .insert("valueOf".to_string(), single_arg_method(&mut checker.arena, boolean));
    let boolean_proto_id = checker.arena.alloc(Type::Object(boolean_proto));
    checker.envs.set_primitive_prototype(root, Primitive::Boolean, boolean_proto_id);
}

fn single_arg_method(arena: &mut TypeArena, return_type: tyck_common::TypeId) -> tyck_common::TypeId {
    let mut obj = ObjectType::empty();
    obj.call_signatures.push(Signature {
        param_types: vec![],
        optional: vec![],
        return_type,
        variadic: false,
        rest_type: None,
    });
    arena.alloc(Type::Object(obj))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyck_common::CheckerOptions;

    #[test]
    fn install_defines_every_documented_global() {
        let mut checker = Checker::new(CheckerOptions::default());
        install(&mut checker);
        let root = checker.root_env();
        for name in ["Array", "Promise", "Generator", "Iterable", "Object", "Function"] {
            assert!(checker.envs.resolve_type(root, name).is_some(), "{name} should be a type alias");
        }
    }

    #[test]
    fn string_prototype_exposes_length_and_methods() {
        let mut checker = Checker::new(CheckerOptions::default());
        install(&mut checker);
        let root = checker.root_env();
        let proto = checker.envs.primitive_prototype(root, Primitive::String).unwrap();
        match checker.arena.get(proto) {
            Type::Object(obj) => assert!(obj.properties.contains_key("length")),
            other => panic!("expected Object, got {other:?}"),
        }
    }
}

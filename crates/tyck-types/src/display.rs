use std::fmt::Write as _;

use crate::arena::TypeArena;
use crate::types::Type;

/// Renders a type the way diagnostics quote it (messages template all
/// interpolate a type's display form via `%s`).
#[must_use]
pub fn display_type(arena: &TypeArena, id: tyck_common::TypeId) -> String {
    let mut out = String::new();
    write_type(arena, id, &mut out);
    out
}

fn write_type(arena: &TypeArena, id: tyck_common::TypeId, out: &mut String) {
    match arena.get(id) {
        Type::Primitive(p) => out.push_str(p.name()),
        Type::Literal(lit) => {
            let _ = write!(out, "{}", lit.value);
        }
        Type::Array(elem) => {
            write_type(arena, *elem, out);
            out.push_str("[]");
        }
        Type::Tuple(tuple) => {
            out.push('[');
            for (i, elem) in tuple.elements.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_type(arena, *elem, out);
                if tuple.optional.get(i).copied().unwrap_or(false) {
                    out.push('?');
                }
            }
            if let Some(rest) = tuple.rest {
                if !tuple.elements.is_empty() {
                    out.push_str(", ");
                }
                out.push_str("...");
                write_type(arena, rest, out);
                out.push_str("[]");
            }
            out.push(']');
        }
        Type::Object(obj) => {
            if obj.is_pure_function() {
                let sig = &obj.call_signatures[0];
                out.push('(');
                for (i, p) in sig.param_types.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_type(arena, *p, out);
                }
                out.push_str(") => ");
                write_type(arena, sig.return_type, out);
                return;
            }
            out.push_str("{ ");
            for (i, (name, ty)) in obj.properties.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                out.push_str(name);
                if obj.optional.contains(name) {
                    out.push('?');
                }
                out.push_str(": ");
                write_type(arena, *ty, out);
            }
            out.push_str(" }");
        }
        Type::Union(members) => join_types(arena, members, " | ", out),
        Type::Intersection(members) => join_types(arena, members, " & ", out),
        Type::TypeParameter(tp) => out.push_str(&tp.name),
        Type::ParameterRef(p) => write_type(arena, *p, out),
        Type::Generic(g) => out.push_str(&g.name),
        Type::Instantiated(inst) => {
            write_type(arena, inst.generic, out);
            out.push('<');
            for (i, a) in inst.args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_type(arena, *a, out);
            }
            out.push('>');
        }
        Type::ForwardReference(name) => out.push_str(name),
        Type::GenericForwardReference { name, args } => {
            out.push_str(name);
            out.push('<');
            for (i, a) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_type(arena, *a, out);
            }
            out.push('>');
        }
        Type::Enum(e) => out.push_str(&e.name),
        Type::EnumMember(m) => {
            let _ = write!(out, "{}.{}", m.enum_name, m.member_name);
        }
        Type::Keyof(operand) => {
            out.push_str("keyof ");
            write_type(arena, *operand, out);
        }
        Type::IndexedAccess { object, index } => {
            write_type(arena, *object, out);
            out.push('[');
            write_type(arena, *index, out);
            out.push(']');
        }
        Type::Conditional(cond) => {
            write_type(arena, cond.check, out);
            out.push_str(" extends ");
            write_type(arena, cond.extends, out);
            out.push_str(" ? ");
            write_type(arena, cond.true_branch, out);
            out.push_str(" : ");
            write_type(arena, cond.false_branch, out);
        }
        Type::Mapped(mapped) => {
            let _ = write!(out, "{{ [{} in ", mapped.param_name);
            write_type(arena, mapped.constraint, out);
            out.push_str("]: ");
            write_type(arena, mapped.value, out);
            out.push_str(" }");
        }
        Type::TypePredicate { param_name, ty } => {
            let _ = write!(out, "{param_name} is ");
            write_type(arena, *ty, out);
        }
        Type::TemplateLiteral(tmpl) => {
            out.push('`');
            for part in &tmpl.parts {
                match part {
                    crate::types::TemplatePart::Literal(s) => out.push_str(s),
                    crate::types::TemplatePart::Type(ty) => {
                        out.push_str("${");
                        write_type(arena, *ty, out);
                        out.push('}');
                    }
                }
            }
            out.push('`');
        }
    }
}

fn join_types(arena: &TypeArena, members: &[tyck_common::TypeId], sep: &str, out: &mut String) {
    for (i, m) in members.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        write_type(arena, *m, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    #[test]
    fn union_displays_with_pipes() {
        let mut arena = TypeArena::new();
        let string = arena.primitive(Primitive::String);
        let number = arena.primitive(Primitive::Number);
        let union = arena.alloc(Type::Union(smallvec::smallvec![string, number]));
        assert_eq!(display_type(&arena, union), "string | number");
    }

    #[test]
    fn array_displays_with_trailing_brackets() {
        let mut arena = TypeArena::new();
        let string = arena.primitive(Primitive::String);
        let array = arena.alloc(Type::Array(string));
        assert_eq!(display_type(&arena, array), "string[]");
    }
}

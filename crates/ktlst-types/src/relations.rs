//! Subtyping, supertype walks, least upper bounds and synthetic accessors.

use crate::environment::TypeEnvironment;
use crate::types::{ANY, BOOLEAN, JAVA_OBJECT, Member, MemberKind, Nullability, Type};
use ktlst_common::limits::MAX_SUPERTYPE_WALK;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::sync::Arc;

/// All transitive supertypes of `ty` in breadth-first order, excluding `ty`.
///
/// Bounded by `MAX_SUPERTYPE_WALK` and cycle-safe.
pub fn supertype_walk<E: TypeEnvironment + ?Sized>(env: &E, ty: &Type) -> Vec<Type> {
    let mut result = Vec::new();
    let Some(start) = ty.fqn() else {
        return result;
    };
    let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
    seen.insert(Arc::from(start));
    let mut queue: VecDeque<Type> = env.supertypes_of(&ty.erased()).into();
    while let Some(next) = queue.pop_front() {
        if result.len() >= MAX_SUPERTYPE_WALK {
            break;
        }
        let Some(fqn) = next.fqn() else { continue };
        if !seen.insert(Arc::from(fqn)) {
            continue;
        }
        queue.extend(env.supertypes_of(&next));
        result.push(next);
    }
    result
}

/// Nominal subtyping with nullability. Platform nullability is compatible
/// with both nullable and non-null positions.
pub fn is_subtype<E: TypeEnvironment + ?Sized>(env: &E, sub: &Type, sup: &Type) -> bool {
    if sub.is_unknown() || sup.is_unknown() {
        return false;
    }
    if sub.nullability() == Nullability::Nullable
        && sup.nullability() == Nullability::NotNull
    {
        return false;
    }
    let (Some(sub_fqn), Some(sup_fqn)) = (sub.fqn(), sup.fqn()) else {
        return false;
    };
    if matches!(sub, Type::Nothing { .. }) || sub_fqn == sup_fqn {
        return true;
    }
    if sup_fqn == ANY || sup_fqn == JAVA_OBJECT {
        return true;
    }
    supertype_walk(env, sub)
        .iter()
        .any(|ty| ty.fqn() == Some(sup_fqn))
}

/// Least upper bound of two types.
///
/// `Nothing` is the bottom type and `null` contributes only nullability.
/// Unrelated classes meet at their first common supertype, else `kotlin.Any`.
pub fn least_upper_bound<E: TypeEnvironment + ?Sized>(env: &E, a: &Type, b: &Type) -> Type {
    match (a, b) {
        (Type::Unknown, _) | (_, Type::Unknown) => Type::Unknown,
        (Type::Nothing { nullable }, other) | (other, Type::Nothing { nullable }) => {
            if *nullable { other.make_nullable() } else { other.clone() }
        }
        (Type::Class(left), Type::Class(right)) => {
            let nullability = left.nullability.join(right.nullability);
            if left.fqn == right.fqn {
                return a.with_nullability(nullability);
            }
            let left_plain = a.make_not_null();
            let right_plain = b.make_not_null();
            if is_subtype(env, &left_plain, &right_plain) {
                return b.with_nullability(nullability);
            }
            if is_subtype(env, &right_plain, &left_plain) {
                return a.with_nullability(nullability);
            }
            supertype_walk(env, &left_plain)
                .into_iter()
                .find(|candidate| is_subtype(env, &right_plain, candidate))
                .unwrap_or_else(|| Type::class(ANY))
                .with_nullability(nullability)
        }
    }
}

/// Kotlin's synthetic property view of a Java getter: `x.name` for
/// `getName()`, `x.isEmpty` for `isEmpty(): Boolean`.
///
/// Looks on `owner` and its supertypes; the returned member is flagged
/// synthetic.
pub fn synthetic_accessor<E: TypeEnvironment + ?Sized>(
    env: &E,
    owner: &Type,
    name: &str,
) -> Option<Member> {
    let mut chars = name.chars();
    let first = chars.next()?;
    let getter = format!("get{}{}", first.to_uppercase(), chars.as_str());
    let boolean_getter = name.len() > 2
        && name.starts_with("is")
        && name[2..].starts_with(|c: char| c.is_ascii_uppercase());

    let mut candidates = vec![owner.erased()];
    candidates.extend(supertype_walk(env, owner));
    for ty in candidates {
        if !env.is_platform(&ty) {
            continue;
        }
        let getter_member = env
            .members_named(&ty, &getter)
            .iter()
            .find(|m| m.kind == MemberKind::Method && m.parameters.is_empty() && !m.is_static);
        let found = getter_member.or_else(|| {
            if !boolean_getter {
                return None;
            }
            env.members_named(&ty, name).iter().find(|m| {
                m.kind == MemberKind::Method
                    && m.parameters.is_empty()
                    && m.declared_type.fqn() == Some(BOOLEAN)
            })
        });
        if let Some(member) = found {
            let mut synthetic = member.clone();
            synthetic.is_synthetic = true;
            return Some(synthetic);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvironmentBuilder;
    use crate::types::{ClassInfo, ClassKind, INT, Origin, STRING};

    fn env() -> crate::InMemoryEnvironment {
        let mut builder = EnvironmentBuilder::new();
        let any = ClassInfo::new(ANY, "kotlin", ClassKind::Class, Origin::Library);
        builder.add_class(any).unwrap();
        for (fqn, supertypes) in [
            ("a.Animal", vec![]),
            ("a.Dog", vec!["a.Animal"]),
            ("a.Cat", vec!["a.Animal"]),
            ("a.Puppy", vec!["a.Dog"]),
            ("kotlin.Int", vec![]),
            ("kotlin.String", vec![]),
        ] {
            let mut info = ClassInfo::new(fqn, "a", ClassKind::Class, Origin::Source);
            info.supertypes = supertypes.into_iter().map(Arc::from).collect();
            builder.add_class(info).unwrap();
        }
        let mut thread = ClassInfo::new("j.Thread", "j", ClassKind::Class, Origin::Platform);
        thread.add_member(Member::method("getName", vec![], Type::class(STRING), "j.Thread"));
        thread.add_member(Member::method("isDaemon", vec![], Type::class(BOOLEAN), "j.Thread"));
        builder.add_class(thread).unwrap();
        builder.freeze().unwrap()
    }

    #[test]
    fn test_supertype_walk_order() {
        let env = env();
        let walk: Vec<String> = supertype_walk(&env, &Type::class("a.Puppy"))
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(walk, vec!["a.Dog", "a.Animal", ANY]);
    }

    #[test]
    fn test_subtyping() {
        let env = env();
        let dog = Type::class("a.Dog");
        assert!(is_subtype(&env, &Type::class("a.Puppy"), &Type::class("a.Animal")));
        assert!(!is_subtype(&env, &Type::class("a.Animal"), &dog));
        assert!(!is_subtype(&env, &dog.make_nullable(), &dog));
        assert!(is_subtype(&env, &dog, &dog.make_nullable()));
        assert!(is_subtype(&env, &Type::NULL, &dog.make_nullable()));
        assert!(!is_subtype(&env, &Type::NULL, &dog));
    }

    #[test]
    fn test_lub() {
        let env = env();
        let int = Type::class(INT);
        assert_eq!(least_upper_bound(&env, &int, &Type::NULL), int.make_nullable());
        assert_eq!(
            least_upper_bound(&env, &Type::class("a.Puppy"), &Type::class("a.Cat")),
            Type::class("a.Animal")
        );
        assert_eq!(
            least_upper_bound(&env, &int, &Type::class(STRING)),
            Type::class(ANY)
        );
        assert!(least_upper_bound(&env, &int, &Type::UNKNOWN).is_unknown());
    }

    #[test]
    fn test_synthetic_accessors() {
        let env = env();
        let thread = Type::class("j.Thread");
        let name = synthetic_accessor(&env, &thread, "name").unwrap();
        assert_eq!(&*name.name, "getName");
        assert!(name.is_synthetic);
        let daemon = synthetic_accessor(&env, &thread, "isDaemon").unwrap();
        assert_eq!(&*daemon.name, "isDaemon");
        assert!(synthetic_accessor(&env, &thread, "priority").is_none());
        // Source classes have no synthetic view.
        assert!(synthetic_accessor(&env, &Type::class("a.Dog"), "name").is_none());
    }
}

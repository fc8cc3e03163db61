//! Remapping of constant values: `ldc` operands, bootstrap arguments and field initial values.
use crate::constant::{ConstantDynamic, ConstantValue, Handle, Type, TypeSort};
use crate::descriptor::is_valid_symbol;
use crate::error::{RemapError, Result};
use crate::remapper::{self, Remapper};

///Remaps the class references held by a constant. Primitive and string constants are returned as they are.
pub fn remap_value<R>(remapper: &R, value: &ConstantValue) -> Result<ConstantValue> where R: Remapper + ?Sized {
    Ok(match value {
        ConstantValue::Type(ty) => ConstantValue::Type(remap_type(remapper, ty)?),
        ConstantValue::Handle(handle) => ConstantValue::Handle(remap_handle(remapper, handle)?),
        ConstantValue::ConstantDynamic(condy) => ConstantValue::ConstantDynamic(remap_constant_dynamic(remapper, condy)?),
        ConstantValue::Array(values) => {
            let values = values.iter().map(|v| remapper.map_value(v)).collect::<Result<Vec<_>>>()?;
            ConstantValue::Array(values)
        }
        ConstantValue::Unknown { tag, .. } => return Err(RemapError::UnsupportedValue { tag: *tag }),
        other => other.clone()
    })
}

///Descriptors go through `map_descriptor`, bare internal names through `map_type`.
pub fn remap_type<R>(remapper: &R, ty: &Type) -> Result<Type> where R: Remapper + ?Sized {
    match ty.sort() {
        TypeSort::Primitive => Ok(ty.clone()),
        TypeSort::Object | TypeSort::Array | TypeSort::Method => Ok(Type::new(remapper.map_descriptor(ty.descriptor())?)),
        TypeSort::Internal if is_valid_symbol(ty.descriptor()) => Ok(Type::new(remapper.map_type(ty.descriptor())?)),
        TypeSort::Internal => Err(RemapError::InvalidDescriptor {
            descriptor: ty.descriptor().to_string(),
            position: 0,
            reason: "neither a type descriptor nor an internal name"
        })
    }
}

///Field handles go through the field hook, everything else through the method hook,
///so `<init>` targets of `NewInvokeSpecial` handles keep their name.
pub fn remap_handle<R>(remapper: &R, handle: &Handle) -> Result<Handle> where R: Remapper + ?Sized {
    let name = if handle.kind.is_field() {
        remapper.map_field_name(&handle.owner, &handle.name, &handle.desc)?
    } else {
        remapper::method_name(remapper, &handle.owner, &handle.name, &handle.desc)?
    };
    Ok(Handle {
        kind: handle.kind,
        owner: remapper.map_type(&handle.owner)?,
        name,
        desc: remapper.map_descriptor(&handle.desc)?,
        is_interface: handle.is_interface
    })
}

pub fn remap_constant_dynamic<R>(remapper: &R, condy: &ConstantDynamic) -> Result<ConstantDynamic> where R: Remapper + ?Sized {
    let args = condy.args.iter().map(|arg| remapper.map_value(arg)).collect::<Result<Vec<_>>>()?;
    Ok(ConstantDynamic {
        name: remapper.map_invoke_dynamic_method_name(&condy.name, &condy.desc)?,
        desc: remapper.map_descriptor(&condy.desc)?,
        bootstrap: remap_handle(remapper, &condy.bootstrap)?,
        args
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::HandleKind;
    use crate::SimpleRemapper;
    use std::rc::Rc;

    struct Condy;
    impl Remapper for Condy {
        fn map_invoke_dynamic_method_name(&self, name: &str, _desc: &str) -> Result<Rc<str>> {
            Ok(Rc::from(format!("new.{}", name)))
        }
        fn map_symbol(&self, name: &str) -> Result<Rc<str>> {
            if name == "java/lang/String" {
                Ok(Rc::from("java/lang/Integer"))
            } else {
                Ok(Rc::from(name))
            }
        }
    }

    fn bootstrap() -> Handle {
        Handle::new(HandleKind::InvokeStatic, "C", "bsm",
            "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;Ljava/lang/Class;)Ljava/lang/Object;", false)
    }

    #[test]
    fn constant_dynamic_name_and_descriptor() {
        let condy = ConstantDynamic::new("foo", "Ljava/lang/String;", bootstrap(), Vec::new());
        let mapped = remap_constant_dynamic(&Condy, &condy).unwrap();
        assert_eq!(&*mapped.name, "new.foo");
        assert_eq!(&*mapped.desc, "Ljava/lang/Integer;");
        assert_eq!(&*mapped.bootstrap.desc,
            "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/Integer;Ljava/lang/Class;)Ljava/lang/Object;");
        assert_eq!(&*mapped.bootstrap.name, "bsm");
    }

    #[test]
    fn nested_bootstrap_arguments() {
        let inner = ConstantDynamic::new("bar", "Ljava/lang/String;", bootstrap(), vec![ConstantValue::Integer(4)]);
        let outer = ConstantValue::ConstantDynamic(ConstantDynamic::new("foo", "I", bootstrap(), vec![
            ConstantValue::ConstantDynamic(inner),
            ConstantValue::Type(Type::object_type("java/lang/String")),
            ConstantValue::String(Rc::from("java/lang/String"))
        ]));
        match remap_value(&Condy, &outer).unwrap() {
            ConstantValue::ConstantDynamic(c) => {
                assert_eq!(c.args[0], ConstantValue::ConstantDynamic(ConstantDynamic::new(
                    "new.bar", "Ljava/lang/Integer;", remap_handle(&Condy, &bootstrap()).unwrap(), vec![ConstantValue::Integer(4)])));
                assert_eq!(c.args[1], ConstantValue::Type(Type::object_type("java/lang/Integer")));
                assert_eq!(c.args[2], ConstantValue::String(Rc::from("java/lang/String")));
            }
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn handle_kinds_pick_the_member_hook() {
        let remapper = SimpleRemapper::new()
            .with_class("a", "pkg/A")
            .with_field("a", "b", "count")
            .with_method("a", "b", "()V", "run")
            .with_method("a", "<init>", "()V", "create");
        let field = Handle::new(HandleKind::GetStatic, "a", "b", "La;", false);
        let method = Handle::new(HandleKind::InvokeVirtual, "a", "b", "()V", false);
        let ctor = Handle::new(HandleKind::NewInvokeSpecial, "a", "<init>", "()V", false);

        let field = remap_handle(&remapper, &field).unwrap();
        assert_eq!((&*field.owner, &*field.name, &*field.desc), ("pkg/A", "count", "Lpkg/A;"));
        let method = remap_handle(&remapper, &method).unwrap();
        assert_eq!((&*method.owner, &*method.name, &*method.desc), ("pkg/A", "run", "()V"));
        let ctor = remap_handle(&remapper, &ctor).unwrap();
        assert_eq!((&*ctor.owner, &*ctor.name), ("pkg/A", "<init>"));
        assert_eq!(ctor.kind, HandleKind::NewInvokeSpecial);
    }

    #[test]
    fn types_and_scalars() {
        let remapper = SimpleRemapper::new().with_class("a", "pkg/A");
        let cases = vec![
            (ConstantValue::Type(Type::new("J")), ConstantValue::Type(Type::new("J"))),
            (ConstantValue::Type(Type::object_type("a")), ConstantValue::Type(Type::object_type("pkg/A"))),
            (ConstantValue::Type(Type::object_type("[[La;")), ConstantValue::Type(Type::new("[[Lpkg/A;"))),
            (ConstantValue::Type(Type::new("(La;)La;")), ConstantValue::Type(Type::new("(Lpkg/A;)Lpkg/A;"))),
            (ConstantValue::String(Rc::from("a")), ConstantValue::String(Rc::from("a"))),
            (ConstantValue::Long(-1), ConstantValue::Long(-1)),
            (ConstantValue::Array(vec![ConstantValue::Type(Type::object_type("a")), ConstantValue::Char(65)]),
                ConstantValue::Array(vec![ConstantValue::Type(Type::object_type("pkg/A")), ConstantValue::Char(65)]))
        ];
        for (input, expected) in cases {
            assert_eq!(remap_value(&remapper, &input).unwrap(), expected);
        }
    }

    #[test]
    fn bare_internal_names_are_remapped() {
        let remapper = SimpleRemapper::new().with_class("pkg/A", "new/A").with_class("Xgarbage", "pkg/Tidy");
        assert_eq!(remap_value(&remapper, &ConstantValue::Type(Type::new("pkg/A"))).unwrap(),
            ConstantValue::Type(Type::new("new/A")));
        assert_eq!(remap_value(&remapper, &ConstantValue::Type(Type::new("Xgarbage"))).unwrap(),
            ConstantValue::Type(Type::new("pkg/Tidy")));
        assert_eq!(remap_value(&remapper, &ConstantValue::Type(Type::new("I"))).unwrap(),
            ConstantValue::Type(Type::new("I")));
    }

    #[test]
    fn malformed_types_are_rejected() {
        let remapper = SimpleRemapper::new();
        for desc in ["", "a;b", "pkg/A<T>", "Lpkg/A", "[Q", "(I"].iter() {
            let value = ConstantValue::Type(Type::new(*desc));
            match remap_value(&remapper, &value) {
                Err(RemapError::InvalidDescriptor { descriptor, .. }) => assert_eq!(descriptor, *desc),
                other => panic!("{:?} remapped to {:?}", desc, other)
            }
        }
    }

    #[test]
    fn unknown_constants_are_rejected() {
        let value = ConstantValue::Unknown { tag: 19, data: Rc::from(&[0u8, 1][..]) };
        assert!(matches!(remap_value(&SimpleRemapper::new(), &value), Err(RemapError::UnsupportedValue { tag: 19 })));
        let nested = ConstantValue::Array(vec![ConstantValue::Integer(1), value]);
        assert!(matches!(remap_value(&SimpleRemapper::new(), &nested), Err(RemapError::UnsupportedValue { tag: 19 })));
    }
}

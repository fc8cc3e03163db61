//! The structural class model handed over by a class reader and produced by [`crate::ClassRemapper`].
use super::{ParameterAccess, ClassAccess, MethodAccess, FieldAccess, InnerClassAccess};
use super::{ExportFlags, RequireFlags, ModuleFlags};
use super::{ClassVersion, Label};
use crate::constant::{ConstantValue, Handle};
use std::rc::Rc;

///A member reference: a name together with its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameAndType {
    pub name: Rc<str>,
    pub desc: Rc<str>
}

impl NameAndType {
    pub fn new<N, D>(name: N, desc: D) -> NameAndType where N: Into<Rc<str>>, D: Into<Rc<str>> {
        NameAndType {
            name: name.into(),
            desc: desc.into()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePathEntry {
    ArrayElement,
    InnerType,
    WildcardBound,
    TypeArgument(u8)
}

pub type TypePath = Vec<TypePathEntry>;

///The target of a type annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef {
    ClassTypeParameter(u8),
    ClassExtends(u16),
    ClassTypeParameterBound { parameter: u8, bound: u8 },
    FieldDeclaration,
    MethodTypeParameter(u8),
    MethodTypeParameterBound { parameter: u8, bound: u8 },
    MethodReturnType,
    MethodReceiverType,
    MethodFormalParameter(u8),
    ThrowsClause(u16),
    LocalVariable,
    ResourceVariable,
    ExceptionParameter(u16),
    Instanceof,
    New,
    ConstructorReference,
    MethodReference,
    Cast(u8),
    GenericConstructorInvocation(u8),
    GenericMethodInvocation(u8),
    GenericConstructorReference(u8),
    GenericMethodReference(u8)
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    ///Primitives, strings and class literals (`ConstantValue::Type`).
    Constant(ConstantValue),
    Enum { desc: Rc<str>, value: Rc<str> },
    Nested(AnnotationNode),
    Array(Vec<AnnotationValue>)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationNode {
    pub desc: Rc<str>,
    ///Element values in declaration order. Unnamed for an annotation default.
    pub values: Vec<(Rc<str>, AnnotationValue)>
}

impl AnnotationNode {
    pub fn new<T>(desc: T) -> AnnotationNode where T: Into<Rc<str>> {
        AnnotationNode {
            desc: desc.into(),
            values: Vec::new()
        }
    }
    pub fn with_value<T>(mut self, name: T, value: AnnotationValue) -> AnnotationNode where T: Into<Rc<str>> {
        self.values.push((name.into(), value));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotationNode {
    pub type_ref: TypeRef,
    pub type_path: TypePath,
    pub annotation: AnnotationNode
}

impl TypeAnnotationNode {
    pub fn new(type_ref: TypeRef, type_path: TypePath, annotation: AnnotationNode) -> TypeAnnotationNode {
        TypeAnnotationNode {
            type_ref, type_path, annotation
        }
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct LocalVariableSpan {
    pub start: Label,
    pub end: Label,
    pub index: u16
}

impl LocalVariableSpan {
    pub fn new(start: Label, end: Label, index: u16) -> LocalVariableSpan {
        LocalVariableSpan {
            start, end, index
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableAnnotationNode {
    pub annotation: TypeAnnotationNode,
    pub spans: Vec<LocalVariableSpan>
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponentNode {
    pub id: NameAndType,
    pub signature: Option<Rc<str>>,
    pub visible_annotations: Vec<AnnotationNode>,
    pub invisible_annotations: Vec<AnnotationNode>,
    pub visible_type_annotations: Vec<TypeAnnotationNode>,
    pub invisible_type_annotations: Vec<TypeAnnotationNode>
}

impl RecordComponentNode {
    pub fn new(id: NameAndType, signature: Option<Rc<str>>) -> RecordComponentNode {
        RecordComponentNode {
            id, signature,
            visible_annotations: Vec::new(),
            invisible_annotations: Vec::new(),
            visible_type_annotations: Vec::new(),
            invisible_type_annotations: Vec::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    pub access: FieldAccess,
    pub id: NameAndType,
    pub signature: Option<Rc<str>>,
    pub value: Option<ConstantValue>,
    pub visible_annotations: Vec<AnnotationNode>,
    pub invisible_annotations: Vec<AnnotationNode>,
    pub visible_type_annotations: Vec<TypeAnnotationNode>,
    pub invisible_type_annotations: Vec<TypeAnnotationNode>
}

impl FieldNode {
    pub fn new(access: FieldAccess, id: NameAndType, signature: Option<Rc<str>>, value: Option<ConstantValue>) -> FieldNode {
        FieldNode {
            access, id, signature, value,
            visible_annotations: Vec::new(),
            invisible_annotations: Vec::new(),
            visible_type_annotations: Vec::new(),
            invisible_type_annotations: Vec::new()
        }
    }
}

///An entry of the `InnerClasses` attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct InnerClassNode {
    pub access: InnerClassAccess,
    ///Internal name of the nested class, e.g. `pkg/Outer$Inner`.
    pub inner_name: Rc<str>,
    ///Simple name as written in source; `None` for anonymous classes.
    pub name: Option<Rc<str>>,
    ///`None` for local and anonymous classes.
    pub outer_name: Option<Rc<str>>
}

impl InnerClassNode {
    pub fn new(access: InnerClassAccess, inner_name: Rc<str>, name: Option<Rc<str>>, outer_name: Option<Rc<str>>) -> InnerClassNode {
        InnerClassNode {
            access, inner_name, name, outer_name
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    Full,
    Append,
    Chop,
    Same,
    Same1
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameItem {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    ///An internal name, or a descriptor for array types.
    Class(Rc<str>),
    Uninitialized(Label)
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstructionNode {
    pub data: InstructionData,
    pub visible_type_annotations: Vec<TypeAnnotationNode>,
    pub invisible_type_annotations: Vec<TypeAnnotationNode>
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstructionData {
    NoArgInsn { opcode: u8 },
    FieldInsn { opcode: u8, owner: Rc<str>, field: NameAndType },
    MethodInsn { opcode: u8, owner: Rc<str>, method: NameAndType, is_interface: bool },
    IincInsn { var: u16, by: i16 },
    IntInsn { opcode: u8, operand: i32 },
    InvokeDynamic { method: NameAndType, bsm: Handle, args: Vec<ConstantValue> },
    JumpInsn { opcode: u8, label: Label },
    LabelNode { label: Label },
    LdcInsn { data: ConstantValue },
    LineNumberNode { line: u16, start: Label },
    LookupswitchInsn { dflt: Label, pairs: Vec<(i32, Label)> },
    ///`desc` is the array descriptor, e.g. `[[Ljava/lang/String;`.
    MultianewInsn { desc: Rc<str>, dims: u8 },
    TableswitchInsn { min: i32, max: i32, dflt: Label, labels: Vec<Label> },
    ///`ty` is an internal name, or a descriptor for array types.
    TypeInsn { opcode: u8, ty: Rc<str> },
    VarInsn { opcode: u8, var: u16 },
    FrameNode { mode: FrameMode, locals: Vec<FrameItem>, stack: Vec<FrameItem> }
}

impl From<InstructionData> for InstructionNode {
    fn from(data: InstructionData) -> InstructionNode {
        InstructionNode::new_raw(data)
    }
}

impl InstructionNode {
    pub fn new_raw(data: InstructionData) -> InstructionNode {
        InstructionNode {
            data,
            visible_type_annotations: Vec::new(),
            invisible_type_annotations: Vec::new()
        }
    }
    pub fn new_insn(opcode: u8) -> InstructionNode {
        InstructionNode::new_raw(InstructionData::NoArgInsn {
            opcode
        })
    }
    pub fn new_field_insn(opcode: u8, owner: Rc<str>, field: NameAndType) -> InstructionNode {
        InstructionNode::new_raw(InstructionData::FieldInsn {
            opcode, owner, field
        })
    }
    pub fn new_method_insn(opcode: u8, owner: Rc<str>, method: NameAndType, is_interface: bool) -> InstructionNode {
        InstructionNode::new_raw(InstructionData::MethodInsn {
            opcode, owner, method, is_interface
        })
    }
    pub fn new_indy_insn(method: NameAndType, bsm: Handle, args: Vec<ConstantValue>) -> InstructionNode {
        InstructionNode::new_raw(InstructionData::InvokeDynamic {
            method, bsm, args
        })
    }
    pub fn new_ldc_insn(data: ConstantValue) -> InstructionNode {
        InstructionNode::new_raw(InstructionData::LdcInsn {
            data
        })
    }
    pub fn new_type_insn(opcode: u8, ty: Rc<str>) -> InstructionNode {
        InstructionNode::new_raw(InstructionData::TypeInsn {
            opcode, ty
        })
    }
    pub fn new_multianew_insn(desc: Rc<str>, dims: u8) -> InstructionNode {
        InstructionNode::new_raw(InstructionData::MultianewInsn {
            desc, dims
        })
    }
    pub fn new_var_insn(opcode: u8, var: u16) -> InstructionNode {
        InstructionNode::new_raw(InstructionData::VarInsn {
            opcode, var
        })
    }
    pub fn new_label_insn(label: Label) -> InstructionNode {
        InstructionNode::new_raw(InstructionData::LabelNode {
            label
        })
    }
    pub fn new_frame_insn(mode: FrameMode, locals: Vec<FrameItem>, stack: Vec<FrameItem>) -> InstructionNode {
        InstructionNode::new_raw(InstructionData::FrameNode {
            mode, locals, stack
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterNode {
    pub access: ParameterAccess,
    pub name: Rc<str>
}

impl ParameterNode {
    pub fn new(access: ParameterAccess, name: Rc<str>) -> ParameterNode {
        ParameterNode {
            access, name
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableNode {
    pub id: NameAndType,
    pub signature: Option<Rc<str>>,
    pub span: LocalVariableSpan
}

impl LocalVariableNode {
    pub fn new(id: NameAndType, signature: Option<Rc<str>>, span: LocalVariableSpan) -> LocalVariableNode {
        LocalVariableNode {
            id, signature, span
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryCatchBlockNode {
    pub start: Label,
    pub end: Label,
    pub handler: Label,
    ///`None` for `finally` blocks.
    pub catch_type: Option<Rc<str>>,
    pub visible_type_annotations: Vec<TypeAnnotationNode>,
    pub invisible_type_annotations: Vec<TypeAnnotationNode>
}

impl TryCatchBlockNode {
    pub fn new(start: Label, end: Label, handler: Label, catch_type: Option<Rc<str>>) -> TryCatchBlockNode {
        TryCatchBlockNode {
            start, end, handler, catch_type,
            visible_type_annotations: Vec::new(),
            invisible_type_annotations: Vec::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodNode {
    pub access: MethodAccess,
    pub id: NameAndType,
    pub signature: Option<Rc<str>>,
    pub exceptions: Vec<Rc<str>>,
    pub parameters: Vec<ParameterNode>,
    pub annotation_default: Option<AnnotationValue>,
    pub visible_annotations: Vec<AnnotationNode>,
    pub invisible_annotations: Vec<AnnotationNode>,
    pub visible_annotable_parameter_count: Option<u8>,
    pub invisible_annotable_parameter_count: Option<u8>,
    pub visible_parameter_annotations: Vec<Vec<AnnotationNode>>,
    pub invisible_parameter_annotations: Vec<Vec<AnnotationNode>>,
    pub visible_type_annotations: Vec<TypeAnnotationNode>,
    pub invisible_type_annotations: Vec<TypeAnnotationNode>,
    pub instructions: Vec<InstructionNode>,
    pub try_catch_blocks: Vec<TryCatchBlockNode>,
    pub local_variables: Vec<LocalVariableNode>,
    pub visible_local_variable_annotations: Vec<LocalVariableAnnotationNode>,
    pub invisible_local_variable_annotations: Vec<LocalVariableAnnotationNode>,
    pub max_stack: u16,
    pub max_locals: u16
}

impl MethodNode {
    pub fn new(access: MethodAccess, id: NameAndType, signature: Option<Rc<str>>, exceptions: Vec<Rc<str>>) -> MethodNode {
        MethodNode {
            access, id, signature, exceptions,
            parameters: Vec::new(),
            annotation_default: None,
            visible_annotations: Vec::new(),
            invisible_annotations: Vec::new(),
            visible_annotable_parameter_count: None,
            invisible_annotable_parameter_count: None,
            visible_parameter_annotations: Vec::new(),
            invisible_parameter_annotations: Vec::new(),
            visible_type_annotations: Vec::new(),
            invisible_type_annotations: Vec::new(),
            instructions: Vec::new(),
            try_catch_blocks: Vec::new(),
            local_variables: Vec::new(),
            visible_local_variable_annotations: Vec::new(),
            invisible_local_variable_annotations: Vec::new(),
            max_stack: 0,
            max_locals: 0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRequireNode {
    pub module: Rc<str>,
    pub access: RequireFlags,
    pub version: Option<Rc<str>>
}

impl ModuleRequireNode {
    pub fn new(module: Rc<str>, access: RequireFlags, version: Option<Rc<str>>) -> ModuleRequireNode {
        ModuleRequireNode {
            module, access, version
        }
    }
}

///An `exports` or `opens` directive. Packages use the internal form (`com/example`).
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleExportNode {
    pub package: Rc<str>,
    pub access: ExportFlags,
    ///Target modules; empty means unqualified.
    pub modules: Vec<Rc<str>>
}

impl ModuleExportNode {
    pub fn new(package: Rc<str>, access: ExportFlags, modules: Vec<Rc<str>>) -> ModuleExportNode {
        ModuleExportNode {
            package, access, modules
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleProvideNode {
    pub service: Rc<str>,
    pub providers: Vec<Rc<str>>
}

impl ModuleProvideNode {
    pub fn new(service: Rc<str>, providers: Vec<Rc<str>>) -> ModuleProvideNode {
        ModuleProvideNode {
            service, providers
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleNode {
    pub name: Rc<str>,
    pub access: ModuleFlags,
    pub version: Option<Rc<str>>,
    pub main_class: Option<Rc<str>>,
    pub packages: Vec<Rc<str>>,
    pub requires: Vec<ModuleRequireNode>,
    pub exports: Vec<ModuleExportNode>,
    pub opens: Vec<ModuleExportNode>,
    pub uses: Vec<Rc<str>>,
    pub provides: Vec<ModuleProvideNode>
}

impl ModuleNode {
    pub fn new(name: Rc<str>, access: ModuleFlags, version: Option<Rc<str>>) -> ModuleNode {
        ModuleNode {
            name, access, version,
            main_class: None,
            packages: Vec::new(),
            requires: Vec::new(),
            exports: Vec::new(),
            opens: Vec::new(),
            uses: Vec::new(),
            provides: Vec::new()
        }
    }
}

///Class attributes that are not part of the structural model.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    ///`ModuleHashes`: a digest per module name, written by `jlink`.
    ModuleHashes { algorithm: Rc<str>, hashes: Vec<(Rc<str>, Rc<[u8]>)> },
    ///Any other attribute, carried as raw bytes.
    Unknown { name: Rc<str>, data: Rc<[u8]> }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassNode {
    pub version: ClassVersion,
    pub access: ClassAccess,
    pub name: Rc<str>,
    pub signature: Option<Rc<str>>,
    pub super_name: Option<Rc<str>>,
    pub interfaces: Vec<Rc<str>>,
    pub source_name: Option<Rc<str>>,
    pub source_debug: Option<String>,
    pub module: Option<ModuleNode>,
    pub nest_host_class: Option<Rc<str>>,
    pub nest_members: Vec<Rc<str>>,
    pub permitted_subclasses: Vec<Rc<str>>,
    pub outer_class: Option<Rc<str>>,
    pub outer_method: Option<NameAndType>,
    pub inner_classes: Vec<InnerClassNode>,
    pub record_components: Vec<RecordComponentNode>,
    pub fields: Vec<FieldNode>,
    pub methods: Vec<MethodNode>,
    pub visible_annotations: Vec<AnnotationNode>,
    pub invisible_annotations: Vec<AnnotationNode>,
    pub visible_type_annotations: Vec<TypeAnnotationNode>,
    pub invisible_type_annotations: Vec<TypeAnnotationNode>,
    pub attributes: Vec<Attribute>
}

impl Default for ClassNode {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassNode {
    pub fn new() -> ClassNode {
        ClassNode {
            version: ClassVersion::new(0, 0),
            access: ClassAccess::empty(),
            name: Rc::from(""),
            signature: None,
            super_name: None,
            interfaces: Vec::new(),
            source_name: None,
            source_debug: None,
            module: None,
            nest_host_class: None,
            nest_members: Vec::new(),
            permitted_subclasses: Vec::new(),
            outer_class: None,
            outer_method: None,
            inner_classes: Vec::new(),
            record_components: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            visible_annotations: Vec::new(),
            invisible_annotations: Vec::new(),
            visible_type_annotations: Vec::new(),
            invisible_type_annotations: Vec::new(),
            attributes: Vec::new()
        }
    }
    ///Fills in the class header the way a reader would on `visit_header`.
    pub fn with_header<N>(version: ClassVersion, access: ClassAccess, name: N, super_name: Option<&str>) -> ClassNode where N: Into<Rc<str>> {
        let mut node = ClassNode::new();
        node.version = version;
        node.access = access;
        node.name = name.into();
        node.super_name = super_name.map(Rc::from);
        node
    }
    pub fn field(&self, name: &str) -> Option<&FieldNode> {
        self.fields.iter().find(|f| &*f.id.name == name)
    }
    pub fn method(&self, name: &str, desc: &str) -> Option<&MethodNode> {
        self.methods.iter().find(|m| &*m.id.name == name && &*m.id.desc == desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_lookups() {
        let mut class = ClassNode::with_header(ClassVersion::V1_8, ClassAccess::ACC_PUBLIC | ClassAccess::ACC_SUPER,
            "pkg/Main", Some("java/lang/Object"));
        class.fields.push(FieldNode::new(FieldAccess::ACC_PRIVATE, NameAndType::new("count", "I"), None, None));
        class.methods.push(MethodNode::new(MethodAccess::ACC_PUBLIC, NameAndType::new("<init>", "()V"), None, Vec::new()));
        class.methods.push(MethodNode::new(MethodAccess::ACC_PUBLIC, NameAndType::new("run", "(I)V"), None, Vec::new()));

        assert_eq!(class.super_name.as_deref(), Some("java/lang/Object"));
        assert!(class.field("count").is_some());
        assert!(class.field("missing").is_none());
        assert!(class.method("run", "(I)V").is_some());
        assert!(class.method("run", "()V").is_none());
        assert_eq!(ClassNode::default(), ClassNode::new());
    }

    #[test]
    fn annotation_values_keep_declaration_order() {
        let ann = AnnotationNode::new("Lpkg/Marker;")
            .with_value("z", AnnotationValue::Constant(ConstantValue::Integer(1)))
            .with_value("a", AnnotationValue::Enum { desc: Rc::from("Lpkg/Kind;"), value: Rc::from("FIRST") });
        let names: Vec<&str> = ann.values.iter().map(|(n, _)| &**n).collect();
        assert_eq!(names, vec!["z", "a"]);
    }
}

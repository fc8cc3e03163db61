//! Walks a [`ClassNode`] and rebuilds it with every symbolic reference passed through a [`Remapper`].
use crate::error::{RemapError, Result};
use crate::inner_class::derive_inner_class;
use crate::remapper::{self, Remapper};
use crate::signature::SignatureKind;
use crate::tree::*;
use crate::value::remap_handle;
use crate::{ApiLevel, ClassAccess};
use log::{debug, trace};
use std::rc::Rc;

///Produces a remapped copy of a class. The input is only borrowed; nothing is shared with the output but
///reference-counted strings.
///
///The traversal is depth-first and visits the class in a fixed order: header, module metadata and attributes,
///nested classes, record components, fields, methods, and finally class annotations. The first error aborts the
///whole class; no partially remapped node is ever returned.
pub struct ClassRemapper<'a, R: ?Sized> {
    api: ApiLevel,
    remapper: &'a R
}

impl<'a, R> ClassRemapper<'a, R> where R: Remapper + ?Sized {
    pub fn new(api: ApiLevel, remapper: &'a R) -> ClassRemapper<'a, R> {
        ClassRemapper {
            api, remapper
        }
    }

    ///Rejects classes using constructs newer than the configured api level. Runs before any policy hook.
    pub fn check_capabilities(&self, class: &ClassNode) -> Result<()> {
        if !self.api.supports(class.version) {
            return Err(RemapError::UnsupportedClassVersion {
                major: class.version.major,
                minor: class.version.minor,
                api: self.api
            });
        }
        self.require(class.module.is_some(), ApiLevel::Java9, "Module")?;
        self.require(class.nest_host_class.is_some() || !class.nest_members.is_empty(), ApiLevel::Java11, "NestHost/NestMembers")?;
        self.require(!class.record_components.is_empty() || class.access.contains(ClassAccess::ACC_RECORD), ApiLevel::Java16, "Record")?;
        self.require(!class.permitted_subclasses.is_empty(), ApiLevel::Java17, "PermittedSubclasses")
    }

    fn require(&self, used: bool, level: ApiLevel, feature: &'static str) -> Result<()> {
        if used && self.api < level {
            Err(RemapError::UnsupportedFeature {
                feature,
                api: self.api
            })
        } else {
            Ok(())
        }
    }

    pub fn remap(&self, class: &ClassNode) -> Result<ClassNode> {
        self.check_capabilities(class)?;
        if class.outer_method.is_some() && class.outer_class.is_none() {
            return Err(RemapError::MalformedClass {
                class: class.name.to_string(),
                reason: "enclosing method without an enclosing class"
            });
        }
        let r = self.remapper;
        let mut out = ClassNode::new();
        out.version = class.version;
        out.access = class.access;
        out.name = r.map_type(&class.name)?;
        debug!("Remapping class {} as {}", class.name, out.name);
        out.signature = self.signature(&class.signature, SignatureKind::Class)?;
        out.super_name = self.optional_type(&class.super_name)?;
        out.interfaces = self.types(&class.interfaces)?;
        out.source_name = class.source_name.clone();
        out.source_debug = class.source_debug.clone();
        if let Some(owner) = &class.outer_class {
            out.outer_method = match &class.outer_method {
                Some(method) => Some(NameAndType {
                    name: remapper::method_name(r, owner, &method.name, &method.desc)?,
                    desc: r.map_descriptor(&method.desc)?
                }),
                None => None
            };
            out.outer_class = Some(r.map_type(owner)?);
        }
        out.nest_host_class = self.optional_type(&class.nest_host_class)?;
        out.nest_members = self.types(&class.nest_members)?;
        out.permitted_subclasses = self.types(&class.permitted_subclasses)?;

        out.module = match &class.module {
            Some(module) => Some(self.module(module)?),
            None => None
        };
        out.attributes = class.attributes.iter().map(|a| self.attribute(a)).collect::<Result<_>>()?;

        out.inner_classes = class.inner_classes.iter().map(|ic| derive_inner_class(r, ic)).collect::<Result<_>>()?;
        out.record_components = class.record_components.iter().map(|rc| self.record_component(&class.name, rc)).collect::<Result<_>>()?;
        out.fields = class.fields.iter().map(|f| self.field(&class.name, f)).collect::<Result<_>>()?;
        out.methods = class.methods.iter().map(|m| self.method(&class.name, m)).collect::<Result<_>>()?;

        out.visible_annotations = self.annotations(&class.visible_annotations)?;
        out.invisible_annotations = self.annotations(&class.invisible_annotations)?;
        out.visible_type_annotations = self.type_annotations(&class.visible_type_annotations)?;
        out.invisible_type_annotations = self.type_annotations(&class.invisible_type_annotations)?;
        debug!("Finished remapping {}", out.name);
        Ok(out)
    }

    fn types(&self, names: &[Rc<str>]) -> Result<Vec<Rc<str>>> {
        names.iter().map(|n| self.remapper.map_type(n)).collect()
    }

    fn optional_type(&self, name: &Option<Rc<str>>) -> Result<Option<Rc<str>>> {
        match name {
            Some(n) => Ok(Some(self.remapper.map_type(n)?)),
            None => Ok(None)
        }
    }

    fn signature(&self, signature: &Option<Rc<str>>, kind: SignatureKind) -> Result<Option<Rc<str>>> {
        match signature {
            Some(s) => Ok(Some(self.remapper.map_signature(s, kind)?)),
            None => Ok(None)
        }
    }

    fn module(&self, module: &ModuleNode) -> Result<ModuleNode> {
        let r = self.remapper;
        let mut out = ModuleNode::new(r.map_module_name(&module.name)?, module.access, module.version.clone());
        out.main_class = self.optional_type(&module.main_class)?;
        out.packages = module.packages.iter().map(|p| r.map_package_name(p)).collect::<Result<_>>()?;
        for require in &module.requires {
            out.requires.push(ModuleRequireNode::new(r.map_module_name(&require.module)?, require.access, require.version.clone()));
        }
        out.exports = module.exports.iter().map(|e| self.export(e)).collect::<Result<_>>()?;
        out.opens = module.opens.iter().map(|e| self.export(e)).collect::<Result<_>>()?;
        out.uses = self.types(&module.uses)?;
        for provide in &module.provides {
            out.provides.push(ModuleProvideNode::new(r.map_type(&provide.service)?, self.types(&provide.providers)?));
        }
        Ok(out)
    }

    fn export(&self, export: &ModuleExportNode) -> Result<ModuleExportNode> {
        let r = self.remapper;
        let modules = export.modules.iter().map(|m| r.map_module_name(m)).collect::<Result<_>>()?;
        Ok(ModuleExportNode::new(r.map_package_name(&export.package)?, export.access, modules))
    }

    fn attribute(&self, attribute: &Attribute) -> Result<Attribute> {
        match attribute {
            Attribute::ModuleHashes { algorithm, hashes } => {
                let hashes = hashes.iter()
                    .map(|(module, hash)| -> Result<(Rc<str>, Rc<[u8]>)> { Ok((self.remapper.map_module_name(module)?, hash.clone())) })
                    .collect::<Result<_>>()?;
                Ok(Attribute::ModuleHashes {
                    algorithm: algorithm.clone(),
                    hashes
                })
            }
            Attribute::Unknown { .. } => Ok(attribute.clone())
        }
    }

    fn record_component(&self, owner: &str, component: &RecordComponentNode) -> Result<RecordComponentNode> {
        let r = self.remapper;
        let id = NameAndType {
            name: r.map_record_component_name(owner, &component.id.name, &component.id.desc)?,
            desc: r.map_descriptor(&component.id.desc)?
        };
        trace!("Record component {}.{} -> {}", owner, component.id.name, id.name);
        let mut out = RecordComponentNode::new(id, self.signature(&component.signature, SignatureKind::Field)?);
        out.visible_annotations = self.annotations(&component.visible_annotations)?;
        out.invisible_annotations = self.annotations(&component.invisible_annotations)?;
        out.visible_type_annotations = self.type_annotations(&component.visible_type_annotations)?;
        out.invisible_type_annotations = self.type_annotations(&component.invisible_type_annotations)?;
        Ok(out)
    }

    fn field(&self, owner: &str, field: &FieldNode) -> Result<FieldNode> {
        let r = self.remapper;
        let id = NameAndType {
            name: r.map_field_name(owner, &field.id.name, &field.id.desc)?,
            desc: r.map_descriptor(&field.id.desc)?
        };
        trace!("Field {}.{}:{} -> {}:{}", owner, field.id.name, field.id.desc, id.name, id.desc);
        let value = match &field.value {
            Some(v) => Some(r.map_value(v)?),
            None => None
        };
        let mut out = FieldNode::new(field.access, id, self.signature(&field.signature, SignatureKind::Field)?, value);
        out.visible_annotations = self.annotations(&field.visible_annotations)?;
        out.invisible_annotations = self.annotations(&field.invisible_annotations)?;
        out.visible_type_annotations = self.type_annotations(&field.visible_type_annotations)?;
        out.invisible_type_annotations = self.type_annotations(&field.invisible_type_annotations)?;
        Ok(out)
    }

    fn method(&self, owner: &str, method: &MethodNode) -> Result<MethodNode> {
        let r = self.remapper;
        let id = NameAndType {
            name: remapper::method_name(r, owner, &method.id.name, &method.id.desc)?,
            desc: r.map_descriptor(&method.id.desc)?
        };
        trace!("Method {}.{}{} -> {}{}", owner, method.id.name, method.id.desc, id.name, id.desc);
        let mut out = MethodNode::new(method.access, id, self.signature(&method.signature, SignatureKind::Method)?,
            self.types(&method.exceptions)?);
        out.parameters = method.parameters.clone();
        out.annotation_default = match &method.annotation_default {
            Some(value) => Some(self.annotation_value(value)?),
            None => None
        };
        out.visible_annotations = self.annotations(&method.visible_annotations)?;
        out.invisible_annotations = self.annotations(&method.invisible_annotations)?;
        out.visible_annotable_parameter_count = method.visible_annotable_parameter_count;
        out.invisible_annotable_parameter_count = method.invisible_annotable_parameter_count;
        out.visible_parameter_annotations = method.visible_parameter_annotations.iter().map(|a| self.annotations(a)).collect::<Result<_>>()?;
        out.invisible_parameter_annotations = method.invisible_parameter_annotations.iter().map(|a| self.annotations(a)).collect::<Result<_>>()?;
        out.visible_type_annotations = self.type_annotations(&method.visible_type_annotations)?;
        out.invisible_type_annotations = self.type_annotations(&method.invisible_type_annotations)?;

        for tcb in &method.try_catch_blocks {
            let mut block = TryCatchBlockNode::new(tcb.start, tcb.end, tcb.handler, self.optional_type(&tcb.catch_type)?);
            block.visible_type_annotations = self.type_annotations(&tcb.visible_type_annotations)?;
            block.invisible_type_annotations = self.type_annotations(&tcb.invisible_type_annotations)?;
            out.try_catch_blocks.push(block);
        }
        out.instructions = method.instructions.iter().map(|i| self.instruction(i)).collect::<Result<_>>()?;
        for local in &method.local_variables {
            let id = NameAndType::new(local.id.name.clone(), r.map_descriptor(&local.id.desc)?);
            out.local_variables.push(LocalVariableNode::new(id, self.signature(&local.signature, SignatureKind::Field)?, local.span));
        }
        out.visible_local_variable_annotations = self.local_variable_annotations(&method.visible_local_variable_annotations)?;
        out.invisible_local_variable_annotations = self.local_variable_annotations(&method.invisible_local_variable_annotations)?;
        out.max_stack = method.max_stack;
        out.max_locals = method.max_locals;
        Ok(out)
    }

    fn instruction(&self, insn: &InstructionNode) -> Result<InstructionNode> {
        let r = self.remapper;
        let data = match &insn.data {
            InstructionData::FieldInsn { opcode, owner, field } => InstructionData::FieldInsn {
                opcode: *opcode,
                owner: r.map_type(owner)?,
                field: NameAndType {
                    name: r.map_field_name(owner, &field.name, &field.desc)?,
                    desc: r.map_descriptor(&field.desc)?
                }
            },
            InstructionData::MethodInsn { opcode, owner, method, is_interface } => InstructionData::MethodInsn {
                opcode: *opcode,
                owner: r.map_type(owner)?,
                method: NameAndType {
                    name: remapper::method_name(r, owner, &method.name, &method.desc)?,
                    desc: r.map_descriptor(&method.desc)?
                },
                is_interface: *is_interface
            },
            InstructionData::InvokeDynamic { method, bsm, args } => InstructionData::InvokeDynamic {
                method: NameAndType {
                    name: r.map_invoke_dynamic_method_name(&method.name, &method.desc)?,
                    desc: r.map_descriptor(&method.desc)?
                },
                bsm: remap_handle(r, bsm)?,
                args: args.iter().map(|a| r.map_value(a)).collect::<Result<_>>()?
            },
            InstructionData::LdcInsn { data } => InstructionData::LdcInsn {
                data: r.map_value(data)?
            },
            InstructionData::TypeInsn { opcode, ty } => InstructionData::TypeInsn {
                opcode: *opcode,
                ty: r.map_type(ty)?
            },
            InstructionData::MultianewInsn { desc, dims } => InstructionData::MultianewInsn {
                desc: r.map_descriptor(desc)?,
                dims: *dims
            },
            InstructionData::FrameNode { mode, locals, stack } => InstructionData::FrameNode {
                mode: *mode,
                locals: self.frame_items(locals)?,
                stack: self.frame_items(stack)?
            },
            other => other.clone()
        };
        Ok(InstructionNode {
            data,
            visible_type_annotations: self.type_annotations(&insn.visible_type_annotations)?,
            invisible_type_annotations: self.type_annotations(&insn.invisible_type_annotations)?
        })
    }

    fn frame_items(&self, items: &[FrameItem]) -> Result<Vec<FrameItem>> {
        items.iter().map(|item| -> Result<FrameItem> { match item {
            FrameItem::Class(name) => Ok(FrameItem::Class(self.remapper.map_type(name)?)),
            other => Ok(other.clone())
        } }).collect()
    }

    fn annotations(&self, annotations: &[AnnotationNode]) -> Result<Vec<AnnotationNode>> {
        annotations.iter().map(|a| self.annotation(a)).collect()
    }

    fn annotation(&self, annotation: &AnnotationNode) -> Result<AnnotationNode> {
        let r = self.remapper;
        let mut out = AnnotationNode::new(r.map_descriptor(&annotation.desc)?);
        for (name, value) in &annotation.values {
            let name = r.map_annotation_attribute_name(&annotation.desc, name)?;
            out.values.push((name, self.annotation_value(value)?));
        }
        Ok(out)
    }

    fn annotation_value(&self, value: &AnnotationValue) -> Result<AnnotationValue> {
        Ok(match value {
            AnnotationValue::Constant(c) => AnnotationValue::Constant(self.remapper.map_value(c)?),
            AnnotationValue::Enum { desc, value } => AnnotationValue::Enum {
                desc: self.remapper.map_descriptor(desc)?,
                value: value.clone()
            },
            AnnotationValue::Nested(nested) => AnnotationValue::Nested(self.annotation(nested)?),
            AnnotationValue::Array(values) => {
                AnnotationValue::Array(values.iter().map(|v| self.annotation_value(v)).collect::<Result<_>>()?)
            }
        })
    }

    fn type_annotations(&self, annotations: &[TypeAnnotationNode]) -> Result<Vec<TypeAnnotationNode>> {
        annotations.iter().map(|ta| -> Result<TypeAnnotationNode> {
            Ok(TypeAnnotationNode::new(ta.type_ref, ta.type_path.clone(), self.annotation(&ta.annotation)?))
        }).collect()
    }

    fn local_variable_annotations(&self, annotations: &[LocalVariableAnnotationNode]) -> Result<Vec<LocalVariableAnnotationNode>> {
        annotations.iter().map(|lva| -> Result<LocalVariableAnnotationNode> {
            Ok(LocalVariableAnnotationNode {
                annotation: TypeAnnotationNode::new(lva.annotation.type_ref, lva.annotation.type_path.clone(),
                    self.annotation(&lva.annotation.annotation)?),
                spans: lva.spans.clone()
            })
        }).collect()
    }
}

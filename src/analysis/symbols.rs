//! Scoped symbol table with typedef resolution
//!
//! A stack of value-semantic frames: each `enter_scope` pushes an owned map,
//! each `exit_scope` pops it and reports which of its symbols were never
//! used. Frames are plain owned values, so popping one branch's scope can
//! never alias or mutate a sibling branch's view.
//!
//! Typedefs live in a parallel stack of alias→type maps; `resolve_type`
//! follows the alias chain recursively down to a primitive, or to
//! [`ValueType::Unknown`] for names never defined.

use rustc_hash::FxHashMap;
use std::fmt;

/// Resolved value types of the teaching subset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Float,
    Char,
    Str,
    Bool,
    Void,
    Unknown,
}

impl ValueType {
    /// Map a written type name to its resolved type. Integer-family and
    /// float-family spellings collapse to `Int`/`Float`; anything else
    /// (typedef aliases included) is `Unknown` here and goes through the
    /// table's typedef chain instead.
    pub fn from_name(name: &str) -> ValueType {
        match name {
            "int" | "short" | "long" | "long long" | "unsigned int" | "unsigned long"
            | "unsigned long long" => ValueType::Int,
            "float" | "double" | "long double" => ValueType::Float,
            "char" => ValueType::Char,
            "string" => ValueType::Str,
            "bool" => ValueType::Bool,
            "void" => ValueType::Void,
            _ => ValueType::Unknown,
        }
    }

    /// Conditions must type as bool or int
    pub fn is_condition_type(self) -> bool {
        matches!(self, ValueType::Bool | ValueType::Int | ValueType::Unknown)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Char => "char",
            ValueType::Str => "string",
            ValueType::Bool => "bool",
            ValueType::Void => "void",
            ValueType::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// What kind of name a symbol is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Typedef,
}

/// Array metadata: one entry per axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayInfo {
    pub sizes: Vec<usize>,
}

impl ArrayInfo {
    pub fn dimensions(&self) -> usize {
        self.sizes.len()
    }
}

/// One declared name
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    /// Type after typedef-chain resolution
    pub ty: ValueType,
    /// The type exactly as written at the declaration
    pub declared_type: String,
    pub kind: SymbolKind,
    pub is_const: bool,
    pub array: Option<ArrayInfo>,
    pub initialized: bool,
    pub used: bool,
    /// Best-effort statically-known constant value at declaration
    pub value: Option<i64>,
    /// 1-based declaration line
    pub line: usize,
}

impl Symbol {
    /// A plain scalar variable
    pub fn variable(name: &str, ty: ValueType, declared_type: &str, line: usize) -> Self {
        Symbol {
            name: name.to_string(),
            ty,
            declared_type: declared_type.to_string(),
            kind: SymbolKind::Variable,
            is_const: false,
            array: None,
            initialized: false,
            used: false,
            value: None,
            line,
        }
    }

    /// A function registered during the globals pass
    pub fn function(name: &str, return_type: ValueType, declared_type: &str, line: usize) -> Self {
        Symbol {
            name: name.to_string(),
            ty: return_type,
            declared_type: declared_type.to_string(),
            kind: SymbolKind::Function,
            is_const: true,
            array: None,
            initialized: true,
            // main is never reported unused
            used: name == "main",
            value: None,
            line,
        }
    }

    /// A typedef alias symbol (tracked for shadowing and duplicates only)
    pub fn typedef(name: &str, target: ValueType, declared_type: &str, line: usize) -> Self {
        Symbol {
            name: name.to_string(),
            ty: target,
            declared_type: declared_type.to_string(),
            kind: SymbolKind::Typedef,
            is_const: true,
            array: None,
            initialized: true,
            used: false,
            value: None,
            line,
        }
    }
}

/// A symbol that was never read before its scope closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedSymbol {
    pub name: String,
    pub line: usize,
}

/// Scope stack of name→symbol frames plus a parallel typedef stack
pub struct SymbolTable {
    scopes: Vec<FxHashMap<String, Symbol>>,
    typedefs: Vec<FxHashMap<String, String>>,
}

impl SymbolTable {
    /// A fresh table with the global scope already open
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![FxHashMap::default()],
            typedefs: vec![FxHashMap::default()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
        self.typedefs.push(FxHashMap::default());
    }

    /// Pop the innermost scope and report its unused symbols (functions and
    /// typedefs excluded), ordered by declaration line for determinism.
    pub fn exit_scope(&mut self) -> Vec<UnusedSymbol> {
        self.typedefs.pop();
        let frame = match self.scopes.pop() {
            Some(frame) => frame,
            None => return Vec::new(),
        };

        let mut unused: Vec<UnusedSymbol> = frame
            .values()
            .filter(|sym| !sym.used && sym.kind == SymbolKind::Variable)
            .map(|sym| UnusedSymbol {
                name: sym.name.clone(),
                line: sym.line,
            })
            .collect();
        unused.sort_by(|a, b| a.line.cmp(&b.line).then_with(|| a.name.cmp(&b.name)));
        unused
    }

    /// Register a symbol in the current scope. Returns false when the name
    /// is already declared in this scope (shadowing an outer scope is fine).
    pub fn declare(&mut self, symbol: Symbol) -> bool {
        let frame = match self.scopes.last_mut() {
            Some(frame) => frame,
            None => return false,
        };
        if frame.contains_key(&symbol.name) {
            return false;
        }
        frame.insert(symbol.name.clone(), symbol);
        true
    }

    /// Innermost-first lookup
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name))
    }

    /// Register a type alias in the current scope
    pub fn define_type(&mut self, alias: &str, target: &str) {
        if let Some(frame) = self.typedefs.last_mut() {
            frame.insert(alias.to_string(), target.to_string());
        }
    }

    /// Resolve a written type name through the typedef chain to a concrete
    /// type; `unknown` if the name was never defined.
    pub fn resolve_type(&self, name: &str) -> ValueType {
        let direct = ValueType::from_name(name);
        if direct != ValueType::Unknown || name == "auto" {
            return direct;
        }

        for frame in self.typedefs.iter().rev() {
            if let Some(target) = frame.get(name) {
                return self.resolve_type(target);
            }
        }
        ValueType::Unknown
    }

    /// Current nesting depth (globals = 1)
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

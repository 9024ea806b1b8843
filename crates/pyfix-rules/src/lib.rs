//! pyfix-rules: Python modernization rule implementations
//!
//! Available rules:
//! - builtins_imports: Remove 'import builtins' and 'from builtins import ...'
//! - dict_comprehension: Convert dict(... for ...) calls to dict comprehensions
//! - dict_literal: Convert dict(...) keyword calls to {...} dict displays
//! - float_conversion: Drop float() wrappers and integral float literals under * and /
//! - future_imports: Remove 'from __future__ import ...' statements
//! - not_in: Convert 'not x in y' to 'x not in y'
//! - object_base: Drop 'object' from class base lists
//! - oserror_alias: Merge OSError aliases in except clauses into OSError
//! - past_imports: Detect imports from the python-future 'past' package
//! - set_literal: Convert set(...) calls to {...} set displays
//! - str_encode: Turn '"abc".encode("utf-8")' into 'b"abc"'
//! - super_args: Convert 'super(Klass, self)' to 'super()'
//! - yield_from: Convert 'for x in it: yield x' to 'yield from it'

use pyfix_core::RuleSet;

pub mod builtins_imports;
pub mod dict_comprehension;
pub mod dict_literal;
pub mod float_conversion;
pub mod future_imports;
mod imports;
pub mod not_in;
pub mod object_base;
pub mod oserror_alias;
pub mod past_imports;
pub mod set_literal;
pub mod str_encode;
pub mod super_args;
pub mod yield_from;

pub use builtins_imports::BuiltinsImports;
pub use dict_comprehension::DictComprehension;
pub use dict_literal::DictLiteral;
pub use float_conversion::FloatConversion;
pub use future_imports::FutureImports;
pub use not_in::NotIn;
pub use object_base::ObjectBase;
pub use oserror_alias::OsErrorAlias;
pub use past_imports::PastImports;
pub use set_literal::SetLiteral;
pub use str_encode::StrEncode;
pub use super_args::SuperArgs;
pub use yield_from::YieldFromLoop;

/// The full rule registry in execution order. Display rewrites run before
/// expression and statement rules so later rules see finished literals.
pub fn with_defaults() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.add(dict_literal::NAME, dict_literal::DESCRIPTION, |_| {
        Box::new(DictLiteral::new())
    });
    rules.add(set_literal::NAME, set_literal::DESCRIPTION, |_| {
        Box::new(SetLiteral)
    });
    rules.add(
        dict_comprehension::NAME,
        dict_comprehension::DESCRIPTION,
        |_| Box::new(DictComprehension),
    );
    rules.add(not_in::NAME, not_in::DESCRIPTION, |_| Box::new(NotIn));
    rules.add(oserror_alias::NAME, oserror_alias::DESCRIPTION, |_| {
        Box::new(OsErrorAlias)
    });
    rules.add(float_conversion::NAME, float_conversion::DESCRIPTION, |_| {
        Box::new(FloatConversion)
    });
    rules.add(yield_from::NAME, yield_from::DESCRIPTION, |_| {
        Box::new(YieldFromLoop)
    });
    rules.add(super_args::NAME, super_args::DESCRIPTION, |_| {
        Box::new(SuperArgs::new())
    });
    rules.add(object_base::NAME, object_base::DESCRIPTION, |_| {
        Box::new(ObjectBase)
    });
    rules.add(
        builtins_imports::NAME,
        builtins_imports::DESCRIPTION,
        |_| Box::new(BuiltinsImports),
    );
    rules.add(future_imports::NAME, future_imports::DESCRIPTION, |config| {
        Box::new(FutureImports::new(config.allow_future.clone()))
    });
    rules.add(str_encode::NAME, str_encode::DESCRIPTION, |_| {
        Box::new(StrEncode)
    });
    rules.add(past_imports::NAME, past_imports::DESCRIPTION, |_| {
        Box::new(PastImports)
    });
    rules
}

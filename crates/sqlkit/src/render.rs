//! Condition rendering.
//!
//! [`render`] walks a [`Condition`] tree and writes dialect text, emitting
//! values according to the active [`BindingPolicy`].

use crate::binding::{BindingPolicy, Param, ParamList};
use crate::builder::StatementBuilder;
use crate::condition::{Condition, Operator, SubQuery};
use crate::error::{SqlError, SqlResult};
use crate::naming::{self, NamingPolicy};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

pub(crate) fn no_overrides() -> &'static HashMap<String, String> {
    static EMPTY: OnceLock<HashMap<String, String>> = OnceLock::new();
    EMPTY.get_or_init(HashMap::new)
}

/// Policies and column overrides in effect while rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx<'a> {
    pub naming: NamingPolicy,
    pub binding: BindingPolicy,
    pub overrides: &'a HashMap<String, String>,
}

impl RenderCtx<'static> {
    pub fn new(naming: NamingPolicy, binding: BindingPolicy) -> Self {
        Self {
            naming,
            binding,
            overrides: no_overrides(),
        }
    }
}

impl<'a> RenderCtx<'a> {
    /// Use an entity's property → column overrides.
    pub fn with_overrides<'b>(self, overrides: &'b HashMap<String, String>) -> RenderCtx<'b> {
        RenderCtx {
            naming: self.naming,
            binding: self.binding,
            overrides,
        }
    }

    pub(crate) fn column(&self, prop: &str) -> String {
        naming::resolve(self.naming, self.overrides, prop)
    }
}

/// Render `cond` into `out`, appending emitted parameters to `params`.
pub fn render(
    cond: &Condition,
    ctx: &RenderCtx<'_>,
    out: &mut String,
    params: &mut ParamList,
) -> SqlResult<()> {
    match cond {
        Condition::Binary { prop, op, value } => {
            out.push_str(&ctx.column(prop));
            out.push(' ');
            out.push_str(op.as_sql());
            out.push(' ');
            write_value(value, prop, ctx, out, params)
        }
        Condition::Between { prop, op, min, max } => {
            out.push_str(&ctx.column(prop));
            out.push(' ');
            out.push_str(op.as_sql());
            out.push(' ');
            let suffix = capitalize(prop);
            write_value(min, &format!("min{suffix}"), ctx, out, params)?;
            out.push_str(" AND ");
            write_value(max, &format!("max{suffix}"), ctx, out, params)
        }
        Condition::In { prop, op, values } => {
            if values.is_empty() {
                return Err(SqlError::validation(format!("{op} list for `{prop}` is empty")));
            }
            out.push_str(&ctx.column(prop));
            out.push(' ');
            out.push_str(op.as_sql());
            out.push_str(" (");
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(value, &format!("{prop}{}", i + 1), ctx, out, params)?;
            }
            out.push(')');
            Ok(())
        }
        Condition::Cell { op, inner } => {
            out.push_str(op.as_sql());
            out.push_str(" (");
            render(inner, ctx, out, params)?;
            out.push(')');
            Ok(())
        }
        Condition::Junction { op, children } => render_junction(*op, children, ctx, out, params),
        Condition::SubQuery(sub) => render_sub_query(sub, ctx, out, params),
        Condition::Expression(text) => {
            out.push_str(text);
            Ok(())
        }
    }
}

/// Render a standalone condition to text and parameters.
pub fn render_to_string(
    cond: &Condition,
    naming: NamingPolicy,
    binding: BindingPolicy,
) -> SqlResult<(String, Vec<Param>)> {
    let mut out = String::new();
    let mut params = ParamList::new();
    render(cond, &RenderCtx::new(naming, binding), &mut out, &mut params)?;
    Ok((out, params.into_vec()))
}

fn render_junction(
    op: Operator,
    children: &[Condition],
    ctx: &RenderCtx<'_>,
    out: &mut String,
    params: &mut ParamList,
) -> SqlResult<()> {
    match children {
        [] => Err(SqlError::EmptyJunction(op)),
        [only] => render(only, ctx, out, params),
        _ => {
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                    out.push_str(op.as_sql());
                    out.push(' ');
                }
                out.push('(');
                render(child, ctx, out, params)?;
                out.push(')');
            }
            Ok(())
        }
    }
}

fn render_sub_query(
    sub: &SubQuery,
    ctx: &RenderCtx<'_>,
    out: &mut String,
    params: &mut ParamList,
) -> SqlResult<()> {
    match sub {
        SubQuery::Raw(sql) => {
            out.push_str(sql);
            Ok(())
        }
        SubQuery::Select {
            props,
            entity_name,
            condition,
        } => {
            let nested = StatementBuilder::new(ctx.naming, ctx.binding)
                .select(props.iter().map(String::as_str))
                .from(entity_name)
                .where_((**condition).clone())
                .build()?;
            let (sql, nested_params) = nested.into_parts();
            out.push_str(&sql);
            for param in nested_params {
                params.push(param);
            }
            Ok(())
        }
    }
}

/// Emit one bound value, as a literal or as a placeholder plus parameter.
pub(crate) fn write_value(
    value: &Value,
    name: &str,
    ctx: &RenderCtx<'_>,
    out: &mut String,
    params: &mut ParamList,
) -> SqlResult<()> {
    match value {
        Value::Placeholder => {
            ctx.binding.write_placeholder(name, out);
            Ok(())
        }
        Value::Condition(cond) => {
            if matches!(cond.as_ref(), Condition::SubQuery(_)) {
                out.push('(');
                render(cond, ctx, out, params)?;
                out.push(')');
                Ok(())
            } else {
                render(cond, ctx, out, params)
            }
        }
        other => {
            match ctx.binding {
                BindingPolicy::InlineLiteral => other.write_literal(out),
                BindingPolicy::PositionalPlaceholder => {
                    out.push('?');
                    params.push(Param::positional(other.clone()));
                }
                BindingPolicy::NamedPlaceholder => {
                    out.push(':');
                    out.push_str(name);
                    params.push(Param::named(name, other.clone()));
                }
            }
            Ok(())
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

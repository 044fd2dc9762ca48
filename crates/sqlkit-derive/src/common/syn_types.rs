//! Type helper utilities for syn type analysis.

/// Extract the inner type T from Option<T>, or return None if not an Option type.
///
/// Recognizes `Option<T>`, `std::option::Option<T>`, and `core::option::Option<T>`.
pub fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    let syn::GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };
    Some(inner)
}

/// Name of the `sqlkit::FieldKind` variant for a field type.
///
/// `Option<T>` and `&T` are classified by `T`. Only the last path segment is
/// inspected, so `chrono::NaiveDate` and `NaiveDate` agree.
pub fn field_kind(ty: &syn::Type) -> &'static str {
    if let Some(inner) = option_inner(ty) {
        return field_kind(inner);
    }
    let ty = match ty {
        syn::Type::Reference(r) => r.elem.as_ref(),
        other => other,
    };
    let syn::Type::Path(type_path) = ty else {
        return "Other";
    };
    let Some(seg) = type_path.path.segments.last() else {
        return "Other";
    };

    match seg.ident.to_string().as_str() {
        "bool" => "Bool",
        "i8" | "i16" | "i32" | "u8" | "u16" | "u32" => "Int",
        "i64" | "u64" | "i128" | "u128" | "isize" | "usize" => "Long",
        "f32" | "f64" => "Float",
        "String" | "str" | "char" => "String",
        "NaiveDate" => "Date",
        "NaiveDateTime" | "DateTime" => "Timestamp",
        "Uuid" => "Uuid",
        "Value" => "Json",
        _ => "Other",
    }
}

use crate::issue::Severity;
use crate::validate::rules::*;
use crate::validate::schema::Schema;

/// The built-in schemas, in registration order.
pub(crate) fn schemas() -> Vec<Schema> {
    vec![pdf_1_7(), pdf_2_0(), pdf_a_1b()]
}

/// The rules every schema starts with.
fn structural(
    schema: Schema,
    id_severity: Severity,
    metadata_required: bool,
    minimum: &'static str,
) -> Schema {
    schema
        .with_rule(StructureRecovery)
        .with_rule(XRefEntries)
        .with_rule(TrailerRoot)
        .with_rule(TrailerSize)
        .with_rule(TrailerId {
            severity: id_severity,
        })
        .with_rule(CatalogType)
        .with_rule(CatalogPages)
        .with_rule(PagesCount)
        .with_rule(PageMediaBox)
        .with_rule(StreamFilters)
        .with_rule(MetadataStream {
            required: metadata_required,
        })
        .with_rule(CatalogVersion { minimum })
}

fn pdf_1_7() -> Schema {
    structural(Schema::new("PDF-1.7", "1.7"), Severity::Warning, false, "1.0")
}

fn pdf_2_0() -> Schema {
    structural(Schema::new("PDF-2.0", "2.0"), Severity::Error, false, "2.0")
        .with_rule(InfoDeprecated)
}

// PDF/A-1 is based on PDF 1.4.
fn pdf_a_1b() -> Schema {
    structural(Schema::new("PDF/A-1b", "1.4"), Severity::Error, true, "1.0")
        .with_rule(NoEncryption)
        .with_rule(NoJavaScript)
        .with_rule(NoExternalActions)
        .with_rule(NoEmbeddedFiles)
        .with_rule(FontsEmbedded)
        .with_rule(MaximumVersion { maximum: "1.4" })
        .with_rule(NoXfa)
        .with_rule(OutputIntentPresent)
        .with_rule(NoLzw)
}

//! The declarative table of served resource types.
//!
//! One generic controller serves every entry; the table only carries what
//! varies per resource: whether search results are wrapped in entry objects,
//! and which reference parameters its searches recognize.

/// Per-resource configuration consumed by the controller and route registrar.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceSpec {
    pub name: &'static str,
    /// Wrap search results in `{title, id, content}` entries.
    pub wrap_entries: bool,
    /// Reference fields recognized as `<field>:<modifier>=<value>` search
    /// parameters.
    pub reference_params: &'static [&'static str],
}

const PATIENT: &[&str] = &["patient"];
const NONE: &[&str] = &[];

macro_rules! resource {
    ($name:literal) => {
        ResourceSpec {
            name: $name,
            wrap_entries: false,
            reference_params: NONE,
        }
    };
    ($name:literal, patient) => {
        ResourceSpec {
            name: $name,
            wrap_entries: false,
            reference_params: PATIENT,
        }
    };
    ($name:literal, patient, wrapped) => {
        ResourceSpec {
            name: $name,
            wrap_entries: true,
            reference_params: PATIENT,
        }
    };
}

/// Every resource type served by the REST surface.
pub const RESOURCES: &[ResourceSpec] = &[
    resource!("Appointment", patient),
    resource!("ReferralRequest", patient),
    resource!("Account", patient),
    resource!("Provenance"),
    resource!("Questionnaire"),
    resource!("ExplanationOfBenefit", patient),
    resource!("DocumentManifest", patient),
    resource!("Specimen", patient),
    resource!("AllergyIntolerance", patient),
    resource!("CarePlan", patient),
    resource!("Goal", patient, wrapped),
    resource!("StructureDefinition"),
    resource!("EnrollmentRequest", patient),
    resource!("EpisodeOfCare", patient),
    resource!("OperationOutcome"),
    resource!("Medication"),
    resource!("Procedure", patient),
    resource!("List", patient),
    resource!("ConceptMap"),
    resource!("Subscription"),
    resource!("ValueSet"),
    resource!("OperationDefinition"),
    resource!("DocumentReference", patient),
    resource!("Order", patient),
    resource!("Immunization", patient),
    resource!("Device", patient),
    resource!("VisionPrescription", patient),
    resource!("Media", patient),
    resource!("Conformance"),
    resource!("ProcedureRequest", patient),
    resource!("EligibilityResponse"),
    resource!("DeviceUseRequest", patient),
    resource!("DeviceMetric"),
    resource!("Flag", patient),
    resource!("RelatedPerson", patient),
    resource!("SupplyRequest", patient),
    resource!("Practitioner"),
    resource!("AppointmentResponse", patient),
    resource!("Observation", patient),
    resource!("MedicationAdministration", patient),
    resource!("Slot"),
    resource!("EnrollmentResponse"),
    resource!("Binary"),
    resource!("MedicationStatement", patient),
    resource!("Person"),
    resource!("Contract"),
    resource!("CommunicationRequest", patient),
    resource!("RiskAssessment", patient),
    resource!("TestScript"),
    resource!("Basic", patient),
    resource!("Group"),
    resource!("PaymentNotice"),
    resource!("Organization"),
    resource!("ImplementationGuide"),
    resource!("ClaimResponse"),
    resource!("EligibilityRequest", patient),
    resource!("ProcessRequest", patient, wrapped),
    resource!("MedicationDispense", patient),
    resource!("DiagnosticReport", patient),
    resource!("ImagingStudy", patient),
    resource!("ImagingObjectSelection", patient),
    resource!("HealthcareService"),
    resource!("DataElement"),
    resource!("DeviceComponent"),
    resource!("FamilyMemberHistory", patient),
    resource!("NutritionOrder", patient),
    resource!("Encounter", patient),
    resource!("Substance"),
    resource!("AuditEvent", patient),
    resource!("MedicationOrder", patient),
    resource!("SearchParameter"),
    resource!("PaymentReconciliation"),
    resource!("Communication", patient),
    resource!("Condition", patient),
    resource!("Composition", patient),
    resource!("DetectedIssue", patient),
    resource!("Bundle"),
    resource!("DiagnosticOrder", patient),
    resource!("Patient"),
    resource!("OrderResponse", patient),
    resource!("Coverage"),
    resource!("QuestionnaireResponse", patient),
    resource!("DeviceUseStatement", patient),
    resource!("ProcessResponse"),
    resource!("NamingSystem"),
    resource!("Schedule"),
    resource!("SupplyDelivery", patient),
    resource!("ClinicalImpression", patient),
    resource!("MessageHeader"),
    resource!("Claim", patient),
    resource!("ImmunizationRecommendation", patient),
    resource!("Location"),
    resource!("BodySite", patient),
];

/// Looks up a resource spec by name.
pub fn find(name: &str) -> Option<&'static ResourceSpec> {
    RESOURCES.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_no_duplicates() {
        let mut names: Vec<_> = RESOURCES.iter().map(|s| s.name).collect();
        names.sort_unstable();
        let len_before = names.len();
        names.dedup();
        assert_eq!(names.len(), len_before);
    }

    #[test]
    fn test_find() {
        assert!(find("Goal").is_some());
        assert!(find("Patient").is_some());
        assert!(find("NoSuchResource").is_none());
    }

    #[test]
    fn test_wrapping_configuration() {
        assert!(find("Goal").unwrap().wrap_entries);
        assert!(find("ProcessRequest").unwrap().wrap_entries);
        assert!(!find("Encounter").unwrap().wrap_entries);
        assert!(!find("Location").unwrap().wrap_entries);
    }

    #[test]
    fn test_reference_params() {
        assert_eq!(find("Goal").unwrap().reference_params, &["patient"]);
        assert!(find("StructureDefinition").unwrap().reference_params.is_empty());
    }

    #[test]
    fn test_table_covers_the_catalog() {
        // The catalog is large by design; the generic controller is what
        // keeps this table from being ninety handler files.
        assert!(RESOURCES.len() > 90);
    }
}

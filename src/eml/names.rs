//! Canonical spelling of EML element names.
//!
//! Fragments arrive with lower-cased names; EML is case-sensitive and
//! uses mixed case (`keywordSet`, `calendarDate`). Each element type
//! owns a table from lower-case name to canonical name.

use crate::dom::Element;

/// One lower-case to canonical pair.
pub type NameEntry = (&'static str, &'static str);

/// A case-insensitive lookup over one or more static tables.
#[derive(Debug, Copy, Clone)]
pub struct NodeNameMap {
    tables: &'static [&'static [NameEntry]],
}

impl NodeNameMap {
    pub const fn new(tables: &'static [&'static [NameEntry]]) -> NodeNameMap {
        NodeNameMap { tables }
    }

    /// The canonical spelling of `name`, or `name` itself when the map
    /// has no entry for it.
    pub fn canonical<'a>(&self, name: &'a str) -> &'a str {
        match self.lookup(name) {
            Some(canonical) => canonical,
            None => name,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&'static str> {
        self.entries()
            .find(|(lower, _)| lower.eq_ignore_ascii_case(name))
            .map(|(_, canonical)| canonical)
    }

    pub fn entries(&self) -> impl Iterator<Item = NameEntry> + '_ {
        self.tables.iter().flat_map(|t| t.iter().copied())
    }

    /// Renames `element`, its attributes and all of its descendants.
    pub fn canonicalize(&self, element: Element<'_>) {
        let mut todo = vec![element];

        while let Some(e) = todo.pop() {
            let name = self.canonical(e.name());
            if name != e.name() {
                e.set_name(name);
            }

            let attributes = e.attributes();
            if attributes.iter().any(|a| self.canonical(a.name()) != a.name()) {
                let pairs: Vec<_> = attributes.iter().map(|a| (self.canonical(a.name()), a.value())).collect();
                for a in &attributes {
                    a.remove_from_parent();
                }
                for (name, value) in pairs {
                    e.set_attribute_value(name, value);
                }
            }

            todo.extend(e.element_children());
        }
    }
}

/// Every mixed-case element and attribute name of EML 2.2. Composed
/// into each node type's map so that content a node carries through
/// unchanged is still written in canonical case.
pub const EML_VOCABULARY: &[NameEntry] = &[
    ("accuracyreport", "accuracyReport"),
    ("actionlist", "actionList"),
    ("additionalclassifications", "additionalClassifications"),
    ("additionalinfo", "additionalInfo"),
    ("additionallinks", "additionalLinks"),
    ("additionalmetadata", "additionalMetadata"),
    ("administrativearea", "administrativeArea"),
    ("allowfirst", "allowFirst"),
    ("alternateidentifier", "alternateIdentifier"),
    ("alternativetimescale", "alternativeTimeScale"),
    ("altitudedatumname", "altitudeDatumName"),
    ("altitudedistanceunits", "altitudeDistanceUnits"),
    ("altitudeencodingmethod", "altitudeEncodingMethod"),
    ("altitudemaximum", "altitudeMaximum"),
    ("altitudeminimum", "altitudeMinimum"),
    ("altituderesolution", "altitudeResolution"),
    ("altitudesysdef", "altitudeSysDef"),
    ("altitudeunits", "altitudeUnits"),
    ("asneeded", "asNeeded"),
    ("associatedparty", "associatedParty"),
    ("attributeaccuracyexplanation", "attributeAccuracyExplanation"),
    ("attributeaccuracyreport", "attributeAccuracyReport"),
    ("attributeaccuracyvalue", "attributeAccuracyValue"),
    ("attributedefinition", "attributeDefinition"),
    ("attributelabel", "attributeLabel"),
    ("attributelist", "attributeList"),
    ("attributename", "attributeName"),
    ("attributeorientation", "attributeOrientation"),
    ("attributereference", "attributeReference"),
    ("audiovisual", "audioVisual"),
    ("authsystem", "authSystem"),
    ("awardnumber", "awardNumber"),
    ("awardurl", "awardUrl"),
    ("banddescription", "bandDescription"),
    ("begindate", "beginDate"),
    ("bilinearfit", "bilinearFit"),
    ("binaryrasterformat", "binaryRasterFormat"),
    ("blockedmembernode", "blockedMemberNode"),
    ("booktitle", "bookTitle"),
    ("boundingaltitudes", "boundingAltitudes"),
    ("boundingcoordinates", "boundingCoordinates"),
    ("calendardate", "calendarDate"),
    ("casesensitive", "caseSensitive"),
    ("cellgeometry", "cellGeometry"),
    ("cellsizexdirection", "cellSizeXDirection"),
    ("cellsizeydirection", "cellSizeYDirection"),
    ("changedate", "changeDate"),
    ("changehistory", "changeHistory"),
    ("changescope", "changeScope"),
    ("chapternumber", "chapterNumber"),
    ("characterencoding", "characterEncoding"),
    ("checkcondition", "checkCondition"),
    ("checkconstraint", "checkConstraint"),
    ("childoccurences", "childOccurences"),
    ("citableclassificationsystem", "citableClassificationSystem"),
    ("classificationsystem", "classificationSystem"),
    ("classificationsystemcitation", "classificationSystemCitation"),
    ("classificationsystemmodifications", "classificationSystemModifications"),
    ("cloudcoverpercentage", "cloudCoverPercentage"),
    ("codedefinition", "codeDefinition"),
    ("codeexplanation", "codeExplanation"),
    ("codesetname", "codesetName"),
    ("codeseturl", "codesetURL"),
    ("collapsedelimiters", "collapseDelimiters"),
    ("commonname", "commonName"),
    ("communicationtype", "communicationType"),
    ("compressiongenerationquality", "compressionGenerationQuality"),
    ("compressionmethod", "compressionMethod"),
    ("conferencedate", "conferenceDate"),
    ("conferencelocation", "conferenceLocation"),
    ("conferencename", "conferenceName"),
    ("conferenceproceedings", "conferenceProceedings"),
    ("connectiondefinition", "connectionDefinition"),
    ("constanttosi", "constantToSI"),
    ("constraintdescription", "constraintDescription"),
    ("constraintname", "constraintName"),
    ("controlpoint", "controlPoint"),
    ("cornerpoint", "cornerPoint"),
    ("customunit", "customUnit"),
    ("dataformat", "dataFormat"),
    ("datasetgpolygon", "datasetGPolygon"),
    ("datasetgpolygonexclusiongring", "datasetGPolygonExclusionGRing"),
    ("datasetgpolygonoutergring", "datasetGPolygonOuterGRing"),
    ("datasource", "dataSource"),
    ("datatable", "dataTable"),
    ("datatype", "dataType"),
    ("datetime", "dateTime"),
    ("datetimedomain", "dateTimeDomain"),
    ("datetimeprecision", "dateTimePrecision"),
    ("defaultvalue", "defaultValue"),
    ("definitionattributereference", "definitionAttributeReference"),
    ("deliverypoint", "deliveryPoint"),
    ("denomflatratio", "denomFlatRatio"),
    ("depthdatumname", "depthDatumName"),
    ("depthdistanceunits", "depthDistanceUnits"),
    ("depthencodingmethod", "depthEncodingMethod"),
    ("depthresolution", "depthResolution"),
    ("depthsysdef", "depthSysDef"),
    ("descriptorvalue", "descriptorValue"),
    ("designdescription", "designDescription"),
    ("dictref", "dictRef"),
    ("diskusage", "diskUsage"),
    ("eastboundingcoordinate", "eastBoundingCoordinate"),
    ("editedbook", "editedBook"),
    ("electronicmailaddress", "electronicMailAddress"),
    ("encodingmethod", "encodingMethod"),
    ("endcondition", "endCondition"),
    ("enddate", "endDate"),
    ("entitycodelist", "entityCodeList"),
    ("entitydescription", "entityDescription"),
    ("entityname", "entityName"),
    ("entityreference", "entityReference"),
    ("entitytype", "entityType"),
    ("enumerateddomain", "enumeratedDomain"),
    ("errorbasis", "errorBasis"),
    ("errorvalues", "errorValues"),
    ("externalcodeset", "externalCodeSet"),
    ("externallydefinedformat", "externallyDefinedFormat"),
    ("fielddelimiter", "fieldDelimiter"),
    ("fieldstartcolumn", "fieldStartColumn"),
    ("fieldwidth", "fieldWidth"),
    ("firstpart", "firstPart"),
    ("foreignkey", "foreignKey"),
    ("formatname", "formatName"),
    ("formatstring", "formatString"),
    ("formatversion", "formatVersion"),
    ("fractiondigits", "fractionDigits"),
    ("funderidentifier", "funderIdentifier"),
    ("fundername", "funderName"),
    ("generaltaxonomiccoverage", "generalTaxonomicCoverage"),
    ("geogcoordsys", "geogCoordSys"),
    ("geographiccoverage", "geographicCoverage"),
    ("geographicdescription", "geographicDescription"),
    ("geometricobjectcount", "geometricObjectCount"),
    ("georeferenceinfo", "georeferenceInfo"),
    ("gettingstarted", "gettingStarted"),
    ("givenname", "givenName"),
    ("gring", "gRing"),
    ("gringlatitude", "gRingLatitude"),
    ("gringlongitude", "gRingLongitude"),
    ("gringpoint", "gRingPoint"),
    ("highwavelength", "highWavelength"),
    ("horizcoordsysdef", "horizCoordSysDef"),
    ("horizcoordsysname", "horizCoordSysName"),
    ("horizontalaccuracy", "horizontalAccuracy"),
    ("identificationreference", "identificationReference"),
    ("identifiername", "identifierName"),
    ("illuminationazimuthangle", "illuminationAzimuthAngle"),
    ("illuminationelevationangle", "illuminationElevationAngle"),
    ("imagedescription", "imageDescription"),
    ("imageorientationangle", "imageOrientationAngle"),
    ("imagequalitycode", "imageQualityCode"),
    ("imagingcondition", "imagingCondition"),
    ("individualname", "individualName"),
    ("intellectualrights", "intellectualRights"),
    ("joincondition", "joinCondition"),
    ("keywordset", "keywordSet"),
    ("keywordthesaurus", "keywordThesaurus"),
    ("keywordtype", "keywordType"),
    ("licensename", "licenseName"),
    ("licenseurl", "licenseURL"),
    ("linenumber", "lineNumber"),
    ("literalcharacter", "literalCharacter"),
    ("literallayout", "literalLayout"),
    ("literaturecited", "literatureCited"),
    ("lowwavelength", "lowWaveLength"),
    ("machineprocessor", "machineProcessor"),
    ("maintenanceupdatefrequency", "maintenanceUpdateFrequency"),
    ("matrixtype", "matrixType"),
    ("maxexclusive", "maxExclusive"),
    ("maxinclusive", "maxInclusive"),
    ("maxlength", "maxLength"),
    ("maxrecordlength", "maxRecordLength"),
    ("maxvalues", "maxValues"),
    ("measurementscale", "measurementScale"),
    ("mediumdensity", "mediumDensity"),
    ("mediumdensityunits", "mediumDensityUnits"),
    ("mediumformat", "mediumFormat"),
    ("mediumname", "mediumName"),
    ("mediumnote", "mediumNote"),
    ("mediumvolume", "mediumVolume"),
    ("metadatalist", "metadataList"),
    ("metadataprovider", "metadataProvider"),
    ("methodstep", "methodStep"),
    ("minexclusive", "minExclusive"),
    ("mininclusive", "minInclusive"),
    ("minlength", "minLength"),
    ("minvalues", "minValues"),
    ("missingvaluecode", "missingValueCode"),
    ("moduledescription", "moduleDescription"),
    ("moduledocs", "moduleDocs"),
    ("modulename", "moduleName"),
    ("multiband", "multiBand"),
    ("multipliertosi", "multiplierToSI"),
    ("nonnumericdomain", "nonNumericDomain"),
    ("northboundingcoordinate", "northBoundingCoordinate"),
    ("notnullconstraint", "notNullConstraint"),
    ("notplanned", "notPlanned"),
    ("numberofbands", "numberOfBands"),
    ("numberofrecords", "numberOfRecords"),
    ("numberofvolumes", "numberOfVolumes"),
    ("numbertype", "numberType"),
    ("numericdomain", "numericDomain"),
    ("numfooterlines", "numFooterLines"),
    ("numheaderlines", "numHeaderLines"),
    ("numphysicallinesperrecord", "numPhysicalLinesPerRecord"),
    ("objectname", "objectName"),
    ("oldvalue", "oldValue"),
    ("onlinedescription", "onlineDescription"),
    ("onlineurl", "onlineUrl"),
    ("operatingsystem", "operatingSystem"),
    ("orderattributereference", "orderAttributeReference"),
    ("organizationname", "organizationName"),
    ("originalpublication", "originalPublication"),
    ("otherentity", "otherEntity"),
    ("othermaintenanceperiod", "otherMaintenancePeriod"),
    ("packageid", "packageId"),
    ("pagerange", "pageRange"),
    ("parameterdefinition", "parameterDefinition"),
    ("parentoccurences", "parentOccurences"),
    ("parentsi", "parentSI"),
    ("peakresponse", "peakResponse"),
    ("personalcommunication", "personalCommunication"),
    ("physicallinedelimiter", "physicalLineDelimiter"),
    ("pointinpixel", "pointInPixel"),
    ("positionname", "positionName"),
    ("postalcode", "postalCode"),
    ("preferredmembernode", "preferredMemberNode"),
    ("preprocessingtypecode", "preProcessingTypeCode"),
    ("primarykey", "primaryKey"),
    ("primemeridian", "primeMeridian"),
    ("proceduralstep", "proceduralStep"),
    ("programminglanguage", "programmingLanguage"),
    ("projcoordsys", "projCoordSys"),
    ("projectionlist", "projectionList"),
    ("propertyuri", "propertyURI"),
    ("pubdate", "pubDate"),
    ("publicationplace", "publicationPlace"),
    ("pubplace", "pubPlace"),
    ("qualitycontrol", "qualityControl"),
    ("quantitativeaccuracymethod", "quantitativeAccuracyMethod"),
    ("quantitativeaccuracyreport", "quantitativeAccuracyReport"),
    ("quantitativeaccuracyvalue", "quantitativeAccuracyValue"),
    ("querystatement", "queryStatement"),
    ("quotecharacter", "quoteCharacter"),
    ("radiometricdataavailability", "radiometricDataAvailability"),
    ("rangeofdates", "rangeOfDates"),
    ("rasterorigin", "rasterOrigin"),
    ("recommendedunits", "recommendedUnits"),
    ("recommendedusage", "recommendedUsage"),
    ("recorddelimiter", "recordDelimiter"),
    ("referencedentityid", "referencedEntityId"),
    ("referencedkey", "referencedKey"),
    ("referencepublication", "referencePublication"),
    ("referencetype", "referenceType"),
    ("relatedentry", "relatedEntry"),
    ("relatedproject", "relatedProject"),
    ("relationshiptype", "relationshipType"),
    ("reportnumber", "reportNumber"),
    ("reprintedition", "reprintEdition"),
    ("researchproject", "researchProject"),
    ("researchtopic", "researchTopic"),
    ("revieweditem", "reviewedItem"),
    ("rowcolumnorientation", "rowColumnOrientation"),
    ("runtimememoryusage", "runtimeMemoryUsage"),
    ("samplingdescription", "samplingDescription"),
    ("scalefactor", "scaleFactor"),
    ("secondpart", "secondPart"),
    ("semiaxismajor", "semiAxisMajor"),
    ("sequenceidentifier", "sequenceIdentifier"),
    ("shortname", "shortName"),
    ("simpledelimited", "simpleDelimited"),
    ("singledatetime", "singleDateTime"),
    ("southboundingcoordinate", "southBoundingCoordinate"),
    ("spatialraster", "spatialRaster"),
    ("spatialreference", "spatialReference"),
    ("spatialsamplingunits", "spatialSamplingUnits"),
    ("spatialvector", "spatialVector"),
    ("standalone", "standAlone"),
    ("standardunit", "standardUnit"),
    ("startcondition", "startCondition"),
    ("storagetype", "storageType"),
    ("storedprocedure", "storedProcedure"),
    ("studyareadescription", "studyAreaDescription"),
    ("studyextent", "studyExtent"),
    ("studytype", "studyType"),
    ("substep", "subStep"),
    ("surname", "surName"),
    ("taxonid", "taxonId"),
    ("taxonomicclassification", "taxonomicClassification"),
    ("taxonomiccompleteness", "taxonomicCompleteness"),
    ("taxonomiccoverage", "taxonomicCoverage"),
    ("taxonomicprocedures", "taxonomicProcedures"),
    ("taxonomicsystem", "taxonomicSystem"),
    ("taxonrankname", "taxonRankName"),
    ("taxonrankvalue", "taxonRankValue"),
    ("temporalcoverage", "temporalCoverage"),
    ("textdelimited", "textDelimited"),
    ("textdomain", "textDomain"),
    ("textfixed", "textFixed"),
    ("textformat", "textFormat"),
    ("timescaleageestimate", "timeScaleAgeEstimate"),
    ("timescaleageexplanation", "timeScaleAgeExplanation"),
    ("timescaleageuncertainty", "timeScaleAgeUncertainty"),
    ("timescalecitation", "timeScaleCitation"),
    ("timescalename", "timeScaleName"),
    ("tonegradation", "toneGradation"),
    ("topologylevel", "topologyLevel"),
    ("totaldigits", "totalDigits"),
    ("totalfigures", "totalFigures"),
    ("totalpages", "totalPages"),
    ("totaltables", "totalTables"),
    ("triangulationindicator", "triangulationIndicator"),
    ("typesystem", "typeSystem"),
    ("uniquekey", "uniqueKey"),
    ("unitlist", "unitList"),
    ("unittype", "unitType"),
    ("usagecitation", "usageCitation"),
    ("userid", "userId"),
    ("valueattributereference", "valueAttributeReference"),
    ("valueuri", "valueURI"),
    ("vertcoordsys", "vertCoordSys"),
    ("verticalaccuracy", "verticalAccuracy"),
    ("virtualmachine", "virtualMachine"),
    ("wavelengthunits", "waveLengthUnits"),
    ("westboundingcoordinate", "westBoundingCoordinate"),
    ("whitespace", "whiteSpace"),
    ("xcoordinate", "xCoordinate"),
    ("xintercept", "xIntercept"),
    ("xslope", "xSlope"),
    ("ycoordinate", "yCoordinate"),
    ("yintercept", "yIntercept"),
    ("yslope", "ySlope"),
];

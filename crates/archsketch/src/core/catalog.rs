//! The fixed service catalog
//!
//! One static table maps every recognized constructor name to its visual
//! metadata. Adding a service is a one-line table change.

use serde::Serialize;
use std::fmt;

/// Visual category of a catalog entry; decides the fill color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Compute,
    Containers,
    Storage,
    Database,
    Analytics,
    Networking,
    Integration,
    Security,
    MachineLearning,
    Generic,
}

impl Category {
    /// Fill color used for shapes of this category
    pub fn fill(&self) -> &'static str {
        match self {
            Category::Compute | Category::Containers => "#ED7100",
            Category::Storage => "#7AA116",
            Category::Database => "#C925D1",
            Category::Analytics | Category::Networking => "#8C4FFF",
            Category::Integration => "#E7157B",
            Category::Security => "#DD344C",
            Category::MachineLearning => "#01A88D",
            Category::Generic => "#232F3E",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Compute => "compute",
            Category::Containers => "containers",
            Category::Storage => "storage",
            Category::Database => "database",
            Category::Analytics => "analytics",
            Category::Networking => "networking",
            Category::Integration => "integration",
            Category::Security => "security",
            Category::MachineLearning => "ml",
            Category::Generic => "generic",
        };
        write!(f, "{}", name)
    }
}

/// One recognized service constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Constructor name as written in diagram source, e.g. `Lambda`
    pub constructor: &'static str,
    pub category: Category,
    /// Default label when the constructor call carries none
    pub label: &'static str,
    /// draw.io shape glyph
    pub glyph: &'static str,
}

impl CatalogEntry {
    pub fn fill(&self) -> &'static str {
        self.category.fill()
    }
}

const fn entry(
    constructor: &'static str,
    category: Category,
    label: &'static str,
    glyph: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        constructor,
        category,
        label,
        glyph,
    }
}

use Category::*;

/// Every constructor the parsers recognize
pub static CATALOG: &[CatalogEntry] = &[
    // compute
    entry("Lambda", Compute, "Lambda Function", "mxgraph.aws4.lambda_function"),
    entry("EC2", Compute, "EC2 Instance", "mxgraph.aws4.ec2"),
    entry("Batch", Compute, "Batch", "mxgraph.aws4.batch"),
    entry("ElasticBeanstalk", Compute, "Elastic Beanstalk", "mxgraph.aws4.elastic_beanstalk"),
    // containers
    entry("ECS", Containers, "ECS", "mxgraph.aws4.ecs"),
    entry("EKS", Containers, "EKS", "mxgraph.aws4.eks"),
    entry("Fargate", Containers, "Fargate", "mxgraph.aws4.fargate"),
    entry("ECR", Containers, "ECR", "mxgraph.aws4.ecr"),
    // storage
    entry("S3", Storage, "S3 Bucket", "mxgraph.aws4.s3"),
    entry("S3Glacier", Storage, "S3 Glacier", "mxgraph.aws4.glacier"),
    entry("EFS", Storage, "EFS", "mxgraph.aws4.elastic_file_system"),
    entry("EBS", Storage, "EBS", "mxgraph.aws4.elastic_block_store"),
    // database
    entry("RDS", Database, "RDS", "mxgraph.aws4.rds"),
    entry("Aurora", Database, "Aurora", "mxgraph.aws4.aurora"),
    entry("DynamoDB", Database, "DynamoDB", "mxgraph.aws4.dynamodb"),
    entry("Dynamodb", Database, "DynamoDB", "mxgraph.aws4.dynamodb"),
    entry("ElastiCache", Database, "ElastiCache", "mxgraph.aws4.elasticache"),
    entry("Redshift", Database, "Redshift", "mxgraph.aws4.redshift"),
    entry("Neptune", Database, "Neptune", "mxgraph.aws4.neptune"),
    entry("DocumentDB", Database, "DocumentDB", "mxgraph.aws4.documentdb_with_mongodb_compatibility"),
    // analytics
    entry("Kinesis", Analytics, "Kinesis Data Streams", "mxgraph.aws4.kinesis_data_streams"),
    entry("KinesisDataFirehose", Analytics, "Kinesis Data Firehose", "mxgraph.aws4.kinesis_data_firehose"),
    entry("Glue", Analytics, "Glue", "mxgraph.aws4.glue"),
    entry("Athena", Analytics, "Athena", "mxgraph.aws4.athena"),
    entry("EMR", Analytics, "EMR", "mxgraph.aws4.emr"),
    entry("Quicksight", Analytics, "QuickSight", "mxgraph.aws4.quicksight"),
    entry("ElasticsearchService", Analytics, "OpenSearch", "mxgraph.aws4.elasticsearch_service"),
    // networking
    entry("APIGateway", Networking, "API Gateway", "mxgraph.aws4.api_gateway"),
    entry("VPC", Networking, "VPC", "mxgraph.aws4.vpc"),
    entry("CloudFront", Networking, "CloudFront", "mxgraph.aws4.cloudfront"),
    entry("Route53", Networking, "Route 53", "mxgraph.aws4.route_53"),
    entry("ELB", Networking, "Elastic Load Balancing", "mxgraph.aws4.elastic_load_balancing"),
    entry("ALB", Networking, "Application Load Balancer", "mxgraph.aws4.application_load_balancer"),
    entry("NLB", Networking, "Network Load Balancer", "mxgraph.aws4.network_load_balancer"),
    entry("InternetGateway", Networking, "Internet Gateway", "mxgraph.aws4.internet_gateway"),
    entry("NATGateway", Networking, "NAT Gateway", "mxgraph.aws4.nat_gateway"),
    entry("DirectConnect", Networking, "Direct Connect", "mxgraph.aws4.direct_connect"),
    // integration
    entry("SQS", Integration, "SQS Queue", "mxgraph.aws4.sqs"),
    entry("SNS", Integration, "SNS Topic", "mxgraph.aws4.sns"),
    entry("Eventbridge", Integration, "EventBridge", "mxgraph.aws4.eventbridge"),
    entry("StepFunctions", Integration, "Step Functions", "mxgraph.aws4.step_functions"),
    entry("MQ", Integration, "Amazon MQ", "mxgraph.aws4.mq"),
    // security
    entry("IAM", Security, "IAM", "mxgraph.aws4.identity_and_access_management"),
    entry("KMS", Security, "KMS", "mxgraph.aws4.key_management_service"),
    entry("Cognito", Security, "Cognito", "mxgraph.aws4.cognito"),
    entry("WAF", Security, "WAF", "mxgraph.aws4.waf"),
    entry("Shield", Security, "Shield", "mxgraph.aws4.shield"),
    entry("SecretsManager", Security, "Secrets Manager", "mxgraph.aws4.secrets_manager"),
    entry("Guardduty", Security, "GuardDuty", "mxgraph.aws4.guardduty"),
    // ml
    entry("Sagemaker", MachineLearning, "SageMaker", "mxgraph.aws4.sagemaker"),
    entry("Rekognition", MachineLearning, "Rekognition", "mxgraph.aws4.rekognition"),
    entry("Comprehend", MachineLearning, "Comprehend", "mxgraph.aws4.comprehend"),
    // generic
    entry("Users", Generic, "Users", "mxgraph.aws4.users"),
    entry("Client", Generic, "Client", "mxgraph.aws4.client"),
    entry("Server", Generic, "Server", "mxgraph.aws4.traditional_server"),
    entry("Mobile", Generic, "Mobile Client", "mxgraph.aws4.mobile_client"),
];

/// Kind substituted when a shape's kind is not in the catalog
pub const DEFAULT_KIND: &str = "Lambda";

/// Kinds used by the two-shape fallback layout
pub const FALLBACK_PAIR: [&str; 2] = ["Lambda", "S3"];

/// Look up a constructor by exact name
pub fn lookup(constructor: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.constructor == constructor)
}

/// Whether `constructor` is a recognized service
pub fn is_known(constructor: &str) -> bool {
    lookup(constructor).is_some()
}

/// Catalog entry for `kind`, or the default entry when unrecognized
pub fn resolve(kind: &str) -> &'static CatalogEntry {
    lookup(kind).unwrap_or_else(default_entry)
}

pub fn default_entry() -> &'static CatalogEntry {
    &CATALOG[0]
}

//! Fixture documents for capability, schema and feature responses.

/// WMS 1.3.0 capabilities with two named layers under an unnamed group.
pub const WMS_CAPABILITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms">
  <Service>
    <Name>WMS</Name>
    <Title>Atlas Web Map Service</Title>
  </Service>
  <Capability>
    <Layer>
      <Title>Atlas layers</Title>
      <CRS>EPSG:4326</CRS>
      <Layer queryable="1">
        <Name>roads</Name>
        <Title>Road network</Title>
        <Abstract>All mapped roads</Abstract>
        <CRS>EPSG:4326</CRS>
        <CRS>EPSG:3857</CRS>
        <EX_GeographicBoundingBox>
          <westBoundLongitude>-10.0</westBoundLongitude>
          <eastBoundLongitude>10.0</eastBoundLongitude>
          <southBoundLatitude>-5.0</southBoundLatitude>
          <northBoundLatitude>5.0</northBoundLatitude>
        </EX_GeographicBoundingBox>
        <BoundingBox CRS="EPSG:3857" minx="-1113194.9" miny="-557305.3" maxx="1113194.9" maxy="557305.3"/>
        <Style>
          <Name>default</Name>
          <Title>Default line style</Title>
        </Style>
      </Layer>
      <Layer queryable="0">
        <Name>rivers</Name>
        <Title>Rivers</Title>
        <CRS>EPSG:4326</CRS>
      </Layer>
    </Layer>
  </Capability>
</WMS_Capabilities>"#;

/// WFS 2.0.0 capabilities with two feature types.
pub const WFS_CAPABILITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wfs:WFS_Capabilities version="2.0.0"
    xmlns:wfs="http://www.opengis.net/wfs/2.0"
    xmlns:ows="http://www.opengis.net/ows/1.1">
  <ows:ServiceIdentification>
    <ows:Title>Atlas Web Feature Service</ows:Title>
  </ows:ServiceIdentification>
  <wfs:FeatureTypeList>
    <wfs:FeatureType>
      <wfs:Name>roads</wfs:Name>
      <wfs:Title>Road network</wfs:Title>
      <wfs:Abstract>All mapped roads</wfs:Abstract>
      <wfs:DefaultCRS>urn:ogc:def:crs:EPSG::4326</wfs:DefaultCRS>
      <wfs:OtherCRS>urn:ogc:def:crs:EPSG::3857</wfs:OtherCRS>
      <ows:WGS84BoundingBox>
        <ows:LowerCorner>-10.0 -5.0</ows:LowerCorner>
        <ows:UpperCorner>10.0 5.0</ows:UpperCorner>
      </ows:WGS84BoundingBox>
    </wfs:FeatureType>
    <wfs:FeatureType>
      <wfs:Name>parcels</wfs:Name>
      <wfs:Title>Land parcels</wfs:Title>
      <wfs:DefaultCRS>urn:ogc:def:crs:EPSG::4326</wfs:DefaultCRS>
    </wfs:FeatureType>
  </wfs:FeatureTypeList>
</wfs:WFS_Capabilities>"#;

/// WMTS 1.0.0 capabilities with one tiled layer.
pub const WMTS_CAPABILITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Capabilities version="1.0.0"
    xmlns="http://www.opengis.net/wmts/1.0"
    xmlns:ows="http://www.opengis.net/ows/1.1">
  <ows:ServiceIdentification>
    <ows:Title>Atlas Tile Service</ows:Title>
    <ows:ServiceType>OGC WMTS</ows:ServiceType>
  </ows:ServiceIdentification>
  <Contents>
    <Layer>
      <ows:Title>Base map</ows:Title>
      <ows:Abstract>Cached base map</ows:Abstract>
      <ows:Identifier>basemap</ows:Identifier>
      <ows:WGS84BoundingBox>
        <ows:LowerCorner>-180 -90</ows:LowerCorner>
        <ows:UpperCorner>180 90</ows:UpperCorner>
      </ows:WGS84BoundingBox>
      <Style isDefault="true">
        <ows:Identifier>default</ows:Identifier>
      </Style>
      <Format>image/png</Format>
      <Format>image/jpeg</Format>
      <TileMatrixSetLink>
        <TileMatrixSet>EPSG:4326</TileMatrixSet>
      </TileMatrixSetLink>
    </Layer>
    <TileMatrixSet>
      <ows:Identifier>EPSG:4326</ows:Identifier>
      <ows:SupportedCRS>urn:ogc:def:crs:EPSG::4326</ows:SupportedCRS>
    </TileMatrixSet>
  </Contents>
</Capabilities>"#;

/// DescribeFeatureType response for the `roads` feature type.
pub const DESCRIBE_ROADS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
    xmlns:gml="http://www.opengis.net/gml/3.2">
  <xsd:complexType name="roadsType">
    <xsd:complexContent>
      <xsd:extension base="gml:AbstractFeatureType">
        <xsd:sequence>
          <xsd:element name="name" type="xsd:string"/>
          <xsd:element name="lanes" type="xsd:int"/>
          <xsd:element name="length_km" type="xsd:double"/>
          <xsd:element name="opened" type="xsd:date"/>
          <xsd:element name="geom" type="gml:MultiLineStringPropertyType"/>
        </xsd:sequence>
      </xsd:extension>
    </xsd:complexContent>
  </xsd:complexType>
</xsd:schema>"#;

/// GetFeature sample whose first feature carries a Polygon geometry.
pub const GETFEATURE_POLYGON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[0,0],[0,2],[3,2],[3,0],[0,0]]]
      },
      "properties": {"name": "block_1"}
    }
  ]
}"#;

/// GetFeature sample with a response-level bbox.
pub const GETFEATURE_WITH_BBOX: &str = r#"{
  "type": "FeatureCollection",
  "bbox": [-10.0, -5.0, 10.0, 5.0],
  "features": [
    {
      "type": "Feature",
      "geometry": {"type": "Point", "coordinates": [1.0, 1.0]},
      "properties": {}
    }
  ]
}"#;
